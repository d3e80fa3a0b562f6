//! Bounding-box outline annotation
//!
//! Draws rectangle outlines for every detected region directly into a grey
//! image: horizontal lines at `top` and `bottom - 1` spanning
//! `[left, right)`, vertical lines at `left` and `right` spanning
//! `[top, bottom - 1)`. Coordinates are clamped to the image; boxes that
//! degenerate after clamping draw nothing.

use crate::label::RegionSet;
use ocellus_core::GreyImage;

/// Outline every region in `regions` with the given intensity
pub fn draw_region_outlines(img: &mut GreyImage, regions: &RegionSet, intensity: u8) {
    let w = img.width();
    let h = img.height();
    if w == 0 || h == 0 {
        return;
    }

    for region in &regions.regions {
        let top = region.top.min(h - 1);
        let bottom = region.bottom.min(h);
        let left = region.left.min(w - 1);
        let right = region.right.min(w - 1);
        if bottom <= top || right <= left {
            continue;
        }

        for x in left..right {
            img.set(x, top, intensity);
            img.set(x, bottom - 1, intensity);
        }
        for y in top..bottom - 1 {
            img.set(left, y, intensity);
            img.set(right, y, intensity);
        }
    }
}
