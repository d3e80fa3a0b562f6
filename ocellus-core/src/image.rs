//! Owned 8-bit grey image buffer
//!
//! Working images are preallocated once and reused every frame; nothing in
//! the per-frame path allocates.

use crate::error::{Error, Result};

/// A width × height grey image backed by a flat row-major buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreyImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GreyImage {
    /// Allocate a zeroed image
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Wrap an existing buffer; its length must match the dimensions
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != width * height {
            return Err(Error::Processing(format!(
                "buffer length {} does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    /// Overwrite every pixel
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Copy another image of identical dimensions into this one
    pub fn copy_from(&mut self, other: &GreyImage) {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        self.data.copy_from_slice(&other.data);
    }

    /// One row as a slice
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let img = GreyImage::new(8, 4);
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 4);
        assert_eq!(img.len(), 32);
        assert!(img.as_slice().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_get_set_row_major() {
        let mut img = GreyImage::new(4, 3);
        img.set(2, 1, 77);
        assert_eq!(img.get(2, 1), 77);
        assert_eq!(img.as_slice()[1 * 4 + 2], 77);
        assert_eq!(img.row(1)[2], 77);
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        assert!(GreyImage::from_vec(4, 4, vec![0; 15]).is_err());
        assert!(GreyImage::from_vec(4, 4, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_fill_and_copy_from() {
        let mut a = GreyImage::new(4, 2);
        a.fill(9);
        let mut b = GreyImage::new(4, 2);
        b.copy_from(&a);
        assert_eq!(b.as_slice(), a.as_slice());
    }
}
