//! 3x3 morphological erosion and dilation
//!
//! Both passes run row-major over the interior `[1, h-2] x [1, w-2]`. The
//! one-pixel border is never written; callers must treat it as undefined.
//! Erode-then-dilate approximates a morphological open: isolated foreground
//! pixels vanish and surviving blobs regrow to size.

use ocellus_core::GreyImage;

/// Erosion: output pixel = bitwise AND of the 3x3 neighborhood
pub fn erode_3x3(src: &GreyImage, dst: &mut GreyImage) {
    debug_assert_eq!(src.width(), dst.width());
    debug_assert_eq!(src.height(), dst.height());

    let w = src.width();
    let h = src.height();
    let s = src.as_slice();
    let d = dst.as_mut_slice();

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let i = y * w + x;
            d[i] = s[i - w - 1]
                & s[i - w]
                & s[i - w + 1]
                & s[i - 1]
                & s[i]
                & s[i + 1]
                & s[i + w - 1]
                & s[i + w]
                & s[i + w + 1];
        }
    }
}

/// Dilation: output pixel = bitwise OR of the 3x3 neighborhood
pub fn dilate_3x3(src: &GreyImage, dst: &mut GreyImage) {
    debug_assert_eq!(src.width(), dst.width());
    debug_assert_eq!(src.height(), dst.height());

    let w = src.width();
    let h = src.height();
    let s = src.as_slice();
    let d = dst.as_mut_slice();

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let i = y * w + x;
            d[i] = s[i - w - 1]
                | s[i - w]
                | s[i - w + 1]
                | s[i - 1]
                | s[i]
                | s[i + 1]
                | s[i + w - 1]
                | s[i + w]
                | s[i + w + 1];
        }
    }
}
