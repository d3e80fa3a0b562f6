//! Grey-level frequency histogram

/// 256-bucket count of grey-level frequencies.
///
/// Rebuilt from scratch for every frame; never partially updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    buckets: [u32; 256],
    total: u64,
}

impl Histogram {
    /// Empty histogram
    pub fn new() -> Self {
        Self {
            buckets: [0; 256],
            total: 0,
        }
    }

    /// Count grey levels over a pixel slice
    pub fn from_pixels(pixels: &[u8]) -> Self {
        let mut hist = Self::new();
        hist.rebuild(pixels);
        hist
    }

    /// Reset and count grey levels over a pixel slice
    pub fn rebuild(&mut self, pixels: &[u8]) {
        self.buckets = [0; 256];
        for &p in pixels {
            self.buckets[p as usize] += 1;
        }
        self.total = pixels.len() as u64;
    }

    #[inline]
    pub fn count(&self, level: u8) -> u32 {
        self.buckets[level as usize]
    }

    /// Total number of counted samples
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn buckets(&self) -> &[u32; 256] {
        &self.buckets
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}
