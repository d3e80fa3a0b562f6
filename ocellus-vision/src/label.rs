//! Connected-component labeling seam
//!
//! The core consumes labeling through the narrow [`RegionLabeler`] contract:
//! a 0x00/0x01 binary image in, a set of bounding-boxed regions out. Region
//! coordinates handed to the annotator are pre-clamped by the labeler.
//! [`ScanLabeler`] is the built-in reference collaborator.

use ocellus_core::{GreyImage, Result};

/// A detected connected foreground component.
///
/// `bottom` and `right` follow the annotator's line conventions: horizontal
/// outlines run at `top` and `bottom - 1`, vertical outlines at `left` and
/// `right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl Region {
    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }
}

/// Ordered sequence of detected objects; discarded after annotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSet {
    pub regions: Vec<Region>,
}

impl RegionSet {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// External labeling collaborator contract
pub trait RegionLabeler {
    /// Label a 0x00/0x01 binary image and extract bounding boxes
    fn label_regions(&mut self, binary: &GreyImage) -> Result<RegionSet>;
}

/// Two-pass 4-connectivity labeler with union-find label merging
pub struct ScanLabeler {
    labels: Vec<u32>,
    parents: Vec<u32>,
}

impl ScanLabeler {
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            parents: Vec::new(),
        }
    }

    fn find(&mut self, mut label: u32) -> u32 {
        while self.parents[label as usize] != label {
            // Path halving
            let grandparent = self.parents[self.parents[label as usize] as usize];
            self.parents[label as usize] = grandparent;
            label = grandparent;
        }
        label
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parents[hi as usize] = lo;
        }
    }
}

impl Default for ScanLabeler {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionLabeler for ScanLabeler {
    fn label_regions(&mut self, binary: &GreyImage) -> Result<RegionSet> {
        let w = binary.width();
        let h = binary.height();
        let src = binary.as_slice();

        self.labels.clear();
        self.labels.resize(w * h, 0);
        self.parents.clear();
        self.parents.push(0); // label 0 = background

        // First pass: provisional labels from the left/top neighbors
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                if src[i] == 0 {
                    continue;
                }
                let left = if x > 0 { self.labels[i - 1] } else { 0 };
                let up = if y > 0 { self.labels[i - w] } else { 0 };
                let label = match (left, up) {
                    (0, 0) => {
                        let fresh = self.parents.len() as u32;
                        self.parents.push(fresh);
                        fresh
                    }
                    (l, 0) => l,
                    (0, u) => u,
                    (l, u) => {
                        self.union(l, u);
                        l.min(u)
                    }
                };
                self.labels[i] = label;
            }
        }

        // Second pass: resolve merged labels and accumulate bounding boxes,
        // ordered by first (root) appearance
        let mut boxes: Vec<(u32, Region)> = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                if self.labels[i] == 0 {
                    continue;
                }
                let root = self.find(self.labels[i]);
                match boxes.iter_mut().find(|(l, _)| *l == root) {
                    Some((_, r)) => {
                        r.top = r.top.min(y);
                        r.left = r.left.min(x);
                        r.bottom = r.bottom.max(y + 1);
                        r.right = r.right.max(x + 1);
                    }
                    None => boxes.push((
                        root,
                        Region {
                            top: y,
                            left: x,
                            bottom: y + 1,
                            right: x + 1,
                        },
                    )),
                }
            }
        }

        // Keep the vertical outline at `right` inside the image
        let regions = boxes
            .into_iter()
            .map(|(_, mut r)| {
                r.right = r.right.min(w.saturating_sub(1));
                r
            })
            .collect();

        Ok(RegionSet { regions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_with_blocks(w: usize, h: usize, blocks: &[(usize, usize, usize, usize)]) -> GreyImage {
        let mut img = GreyImage::new(w, h);
        for &(top, left, bottom, right) in blocks {
            for y in top..bottom {
                for x in left..right {
                    img.set(x, y, 1);
                }
            }
        }
        img
    }

    #[test]
    fn test_empty_image_no_regions() {
        let img = GreyImage::new(16, 16);
        let set = ScanLabeler::new().label_regions(&img).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_single_block_bounding_box() {
        let img = binary_with_blocks(32, 32, &[(4, 6, 14, 16)]);
        let set = ScanLabeler::new().label_regions(&img).unwrap();
        assert_eq!(set.len(), 1);
        let r = set.regions[0];
        assert_eq!(r.top, 4);
        assert_eq!(r.left, 6);
        assert_eq!(r.bottom, 14);
        assert_eq!(r.right, 16);
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 10);
    }

    #[test]
    fn test_two_separate_blocks() {
        let img = binary_with_blocks(32, 32, &[(2, 2, 6, 6), (20, 20, 28, 30)]);
        let set = ScanLabeler::new().label_regions(&img).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.regions[0],
            Region { top: 2, left: 2, bottom: 6, right: 6 }
        );
        assert_eq!(
            set.regions[1],
            Region { top: 20, left: 20, bottom: 28, right: 30 }
        );
    }

    #[test]
    fn test_u_shape_merges_to_one_region() {
        // Two vertical arms joined at the bottom: provisional labels must merge
        let mut img = GreyImage::new(16, 16);
        for y in 2..10 {
            img.set(3, y, 1);
            img.set(8, y, 1);
        }
        for x in 3..=8 {
            img.set(x, 9, 1);
        }
        let set = ScanLabeler::new().label_regions(&img).unwrap();
        assert_eq!(set.len(), 1);
        let r = set.regions[0];
        assert_eq!((r.top, r.left, r.bottom, r.right), (2, 3, 10, 9));
    }

    #[test]
    fn test_diagonal_pixels_are_separate() {
        // 4-connectivity: diagonal touch does not connect
        let mut img = GreyImage::new(8, 8);
        img.set(2, 2, 1);
        img.set(3, 3, 1);
        let set = ScanLabeler::new().label_regions(&img).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_right_edge_clamped_for_annotator() {
        let w = 16;
        let img = binary_with_blocks(w, 16, &[(2, 10, 6, 16)]);
        let set = ScanLabeler::new().label_regions(&img).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.regions[0].right <= w - 1);
    }

    #[test]
    fn test_labeler_is_reusable() {
        let mut labeler = ScanLabeler::new();
        let a = binary_with_blocks(16, 16, &[(1, 1, 4, 4)]);
        let b = GreyImage::new(16, 16);
        assert_eq!(labeler.label_regions(&a).unwrap().len(), 1);
        assert_eq!(labeler.label_regions(&b).unwrap().len(), 0);
        assert_eq!(labeler.label_regions(&a).unwrap().len(), 1);
    }
}
