//! Half-resolution greyscale debayering
//!
//! Reconstructs a grey image at half the sensor resolution by collapsing
//! each 2x2 mosaic cell into one pixel. Every cell holds one red, one blue
//! and two green samples regardless of the row ordering, so the cell mean
//! is a usable luminance estimate for any [`BayerOrder`].

use ocellus_core::{BayerOrder, Error, GreyImage, Result};

/// Debayer `raw` (a `width` x `height` mosaic) into a preallocated
/// half-resolution grey image.
pub fn debayer_grey_half_into(
    raw: &[u8],
    width: usize,
    height: usize,
    order: BayerOrder,
    out: &mut GreyImage,
) -> Result<()> {
    if raw.len() != width * height {
        return Err(Error::Processing(format!(
            "raw buffer length {} does not match {}x{}",
            raw.len(),
            width,
            height
        )));
    }
    if out.width() != width / 2 || out.height() != height / 2 {
        return Err(Error::Processing(format!(
            "output {}x{} does not match half resolution {}x{}",
            out.width(),
            out.height(),
            width / 2,
            height / 2
        )));
    }
    // The cell mean is ordering-independent; the parameter pins down the
    // contract with the capture driver.
    let _ = order;

    let half_w = width / 2;
    let dst = out.as_mut_slice();
    for cy in 0..height / 2 {
        let row0 = 2 * cy * width;
        let row1 = row0 + width;
        for cx in 0..half_w {
            let x = 2 * cx;
            let sum = raw[row0 + x] as u16
                + raw[row0 + x + 1] as u16
                + raw[row1 + x] as u16
                + raw[row1 + x + 1] as u16;
            dst[cy * half_w + cx] = (sum / 4) as u8;
        }
    }
    Ok(())
}

/// Allocating convenience wrapper around [`debayer_grey_half_into`]
pub fn debayer_grey_half(
    raw: &[u8],
    width: usize,
    height: usize,
    order: BayerOrder,
) -> Result<GreyImage> {
    let mut out = GreyImage::new(width / 2, height / 2);
    debayer_grey_half_into(raw, width, height, order, &mut out)?;
    Ok(out)
}
