//! Per-frame processing pipeline
//!
//! Converts one grey working image into an annotated result: histogram,
//! Otsu threshold, binarization, 3x3 erode/dilate, labeler handoff and
//! bounding-box annotation. All scratch buffers are preallocated; one call
//! processes exactly one frame and performs no allocation.

use crate::annotate::draw_region_outlines;
use crate::histogram::Histogram;
use crate::label::{RegionLabeler, RegionSet};
use crate::morph::{dilate_3x3, erode_3x3};
use crate::otsu::otsu_threshold;
use ocellus_core::{Error, GreyImage, PipelineConfig, Result};
use tracing::debug;

/// Frame pipeline with per-frame scratch buffers
pub struct FramePipeline {
    config: PipelineConfig,
    hist: Histogram,
    threshold_mask: GreyImage,
    eroded: GreyImage,
    dilated: GreyImage,
    binary: GreyImage,
    last_threshold: u8,
}

impl FramePipeline {
    /// Preallocate all working images for `width` x `height` frames
    pub fn new(width: usize, height: usize, config: PipelineConfig) -> Self {
        Self {
            config,
            hist: Histogram::new(),
            threshold_mask: GreyImage::new(width, height),
            eroded: GreyImage::new(width, height),
            dilated: GreyImage::new(width, height),
            binary: GreyImage::new(width, height),
            last_threshold: 0,
        }
    }

    /// Process one frame.
    ///
    /// `grey` is both input and output: on return it carries the region
    /// outlines at the configured intensity. The dilated mask is annotated
    /// with the second intensity so the two outputs stay distinguishable.
    pub fn process(
        &mut self,
        grey: &mut GreyImage,
        labeler: &mut dyn RegionLabeler,
    ) -> Result<RegionSet> {
        if grey.width() != self.threshold_mask.width()
            || grey.height() != self.threshold_mask.height()
        {
            return Err(Error::Processing(format!(
                "frame {}x{} does not match pipeline {}x{}",
                grey.width(),
                grey.height(),
                self.threshold_mask.width(),
                self.threshold_mask.height()
            )));
        }

        self.hist.rebuild(grey.as_slice());
        let threshold = otsu_threshold(&self.hist);
        self.last_threshold = threshold;

        // Foreground estimate: everything at or above the threshold
        for (dst, &src) in self
            .threshold_mask
            .as_mut_slice()
            .iter_mut()
            .zip(grey.as_slice())
        {
            *dst = if src < threshold { 0 } else { 0xff };
        }

        erode_3x3(&self.threshold_mask, &mut self.eroded);
        dilate_3x3(&self.eroded, &mut self.dilated);

        // The labeler expects a 0/1 encoding rather than the 0/255 mask.
        // Only the interior is rebuilt; morphology never writes the border,
        // so the binary border stays zero and stale annotation in the
        // dilated scratch cannot leak into the next frame.
        let (w, h) = (self.binary.width(), self.binary.height());
        let cut = self.config.binary_threshold;
        for y in 1..h.saturating_sub(1) {
            for x in 1..w.saturating_sub(1) {
                self.binary.set(x, y, u8::from(self.dilated.get(x, y) >= cut));
            }
        }

        let regions = labeler.label_regions(&self.binary)?;
        debug!(
            threshold,
            objects = regions.len(),
            "frame segmented"
        );

        draw_region_outlines(grey, &regions, self.config.outline_intensity);
        draw_region_outlines(
            &mut self.dilated,
            &regions,
            self.config.mask_outline_intensity,
        );

        Ok(regions)
    }

    /// Threshold selected for the most recent frame
    pub fn last_threshold(&self) -> u8 {
        self.last_threshold
    }

    /// Dilated (and outline-annotated) foreground mask of the last frame
    pub fn dilated_mask(&self) -> &GreyImage {
        &self.dilated
    }

    /// Raw threshold mask of the last frame, before morphology
    pub fn threshold_mask(&self) -> &GreyImage {
        &self.threshold_mask
    }
}
