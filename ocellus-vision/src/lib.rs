//! ocellus-vision: per-frame image processing for the Ocellus camera core
//!
//! Converts one debayered grey frame into a binary foreground mask with
//! labeled, bounding-boxed objects: adaptive thresholding via Otsu's method,
//! 3x3 morphological erosion/dilation for noise suppression, connected
//! component labeling behind a collaborator seam, and outline annotation.

pub mod annotate;
pub mod debayer;
pub mod histogram;
pub mod label;
pub mod morph;
pub mod otsu;
pub mod pipeline;

pub use histogram::Histogram;
pub use label::{Region, RegionLabeler, RegionSet, ScanLabeler};
pub use pipeline::FramePipeline;
