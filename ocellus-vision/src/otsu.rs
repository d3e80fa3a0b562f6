//! Otsu threshold selection
//!
//! Picks the grey level that maximizes the between-class variance of the
//! histogram. Candidates where either class is empty are non-competitive
//! (never divides by zero). Ties on the score are resolved in favor of the
//! largest candidate level: the scan runs ascending and replaces the best
//! on `>=`, which downstream consumers rely on.

use crate::histogram::Histogram;

/// Optimal binary-separation grey level for `hist`.
///
/// Returns 0 when no candidate splits the histogram into two non-empty
/// classes (empty or single-level input).
pub fn otsu_threshold(hist: &Histogram) -> u8 {
    let buckets = hist.buckets();

    let mut w_total: u64 = 0;
    let mut m_total: u64 = 0;
    for (g, &count) in buckets.iter().enumerate() {
        w_total += count as u64;
        m_total += count as u64 * g as u64;
    }

    let mut best_k: u8 = 0;
    let mut best_score = 0.0_f64;

    // w0/m0 cover [0, k), w1/m1 cover [k, 256)
    let mut w0: u64 = 0;
    let mut m0: u64 = 0;
    for k in 0..=255u8 {
        let w1 = w_total - w0;
        let m1 = m_total - m0;
        if w0 > 0 && w1 > 0 {
            let mean_diff = m0 as f64 / w0 as f64 - m1 as f64 / w1 as f64;
            let score = (w0 as f64) * (w1 as f64) * mean_diff * mean_diff;
            if score >= best_score {
                best_score = score;
                best_k = k;
            }
        }
        w0 += buckets[k as usize] as u64;
        m0 += buckets[k as usize] as u64 * k as u64;
    }

    best_k
}
