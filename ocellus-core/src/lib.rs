//! ocellus-core: shared foundation for the Ocellus smart-camera core
//!
//! Holds the types exchanged between the acquisition controller and the
//! frame pipeline (capture modes, the application state snapshot, the
//! pending-request lifecycle), the grey image buffer, the configuration
//! system and the error taxonomy.

pub mod config;
pub mod error;
pub mod image;
pub mod types;

pub use config::{CamConfig, CaptureConfig, PipelineConfig, SensorConfig};
pub use error::{Error, Result};
pub use image::GreyImage;
pub use types::{AppState, BayerOrder, CaptureMode, ReqStatus, RequestKind};
