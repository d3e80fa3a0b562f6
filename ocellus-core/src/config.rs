//! Configuration for the Ocellus camera core

use crate::error::{Error, Result};
use crate::types::BayerOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sensor geometry and mosaic layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Raw sensor width in pixels
    pub width: usize,
    /// Raw sensor height in pixels
    pub height: usize,
    /// Bayer mosaic ordering of the first row pair
    pub bayer: BayerOrder,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            width: 752,
            height: 480,
            bayer: BayerOrder::Bgbg,
        }
    }
}

impl SensorConfig {
    /// Width of the debayered half-resolution working image
    pub fn half_width(&self) -> usize {
        self.width / 2
    }

    /// Height of the debayered half-resolution working image
    pub fn half_height(&self) -> usize {
        self.height / 2
    }
}

/// Capture timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// How long one read-frame call waits before reporting a timeout
    pub timeout_ms: u64,
    /// Pause after the sequential-phase event so a re-trigger does not
    /// violate the sensor's vertical blank time
    pub vblank_delay_us: u64,
    /// Preallocated raw frame slots
    pub frame_slots: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 4,
            vblank_delay_us: 4000,
            frame_slots: 2,
        }
    }
}

/// Frame-pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Cut used when converting the 0/255 dilated mask to the labeler's
    /// 0/1 encoding
    pub binary_threshold: u8,
    /// Intensity of box outlines drawn into the grey result image
    pub outline_intensity: u8,
    /// Intensity of box outlines drawn into the dilated mask
    pub mask_outline_intensity: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            binary_threshold: 0x80,
            outline_intensity: 255,
            mask_outline_intensity: 128,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CamConfig {
    pub sensor: SensorConfig,
    pub capture: CaptureConfig,
    pub pipeline: PipelineConfig,
}

impl CamConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: CamConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("parse {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides (OCELLUS_SENSOR_WIDTH, OCELLUS_SENSOR_HEIGHT,
    /// OCELLUS_CAPTURE_TIMEOUT_MS)
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("OCELLUS_SENSOR_WIDTH") {
            if let Ok(w) = v.parse() {
                self.sensor.width = w;
            }
        }
        if let Ok(v) = std::env::var("OCELLUS_SENSOR_HEIGHT") {
            if let Ok(h) = v.parse() {
                self.sensor.height = h;
            }
        }
        if let Ok(v) = std::env::var("OCELLUS_CAPTURE_TIMEOUT_MS") {
            if let Ok(t) = v.parse() {
                self.capture.timeout_ms = t;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.sensor.width == 0 || self.sensor.height == 0 {
            return Err(Error::Config("sensor dimensions must be non-zero".into()));
        }
        if self.sensor.width % 2 != 0 || self.sensor.height % 2 != 0 {
            return Err(Error::Config(
                "sensor dimensions must be even for half-size debayering".into(),
            ));
        }
        if self.sensor.width > 8192 || self.sensor.height > 8192 {
            return Err(Error::Config("sensor dimensions too large (max 8192)".into()));
        }
        // The morphological interior needs at least one non-border pixel
        if self.sensor.half_width() < 3 || self.sensor.half_height() < 3 {
            return Err(Error::Config(
                "half-resolution image must be at least 3x3".into(),
            ));
        }
        if self.capture.frame_slots == 0 {
            return Err(Error::Config("frame_slots must be > 0".into()));
        }
        if self.pipeline.binary_threshold == 0 {
            return Err(Error::Config("binary_threshold must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default_is_valid() {
        let config = CamConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sensor.width, 752);
        assert_eq!(config.sensor.height, 480);
        assert_eq!(config.sensor.half_width(), 376);
        assert_eq!(config.sensor.half_height(), 240);
        assert_eq!(config.capture.vblank_delay_us, 4000);
        assert_eq!(config.pipeline.binary_threshold, 0x80);
        assert_eq!(config.pipeline.outline_intensity, 255);
        assert_eq!(config.pipeline.mask_outline_intensity, 128);
    }

    #[test]
    fn test_config_validation_zero_dims() {
        let mut config = CamConfig::default();
        config.sensor.width = 0;
        assert!(config.validate().is_err());

        let mut config = CamConfig::default();
        config.sensor.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_odd_dims() {
        let mut config = CamConfig::default();
        config.sensor.width = 751;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_tiny_image() {
        let mut config = CamConfig::default();
        config.sensor.width = 4;
        config.sensor.height = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_no_slots() {
        let mut config = CamConfig::default();
        config.capture.frame_slots = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[sensor]\nwidth = 64\nheight = 48\nbayer = \"Bgbg\"\n\n[capture]\ntimeout_ms = 10\nvblank_delay_us = 0\nframe_slots = 1\n"
        )
        .unwrap();
        let config = CamConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sensor.width, 64);
        assert_eq!(config.sensor.height, 48);
        assert_eq!(config.capture.timeout_ms, 10);
        assert_eq!(config.capture.frame_slots, 1);
        // Sections not present fall back to defaults
        assert_eq!(config.pipeline.binary_threshold, 0x80);
    }

    #[test]
    fn test_config_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not valid toml [").unwrap();
        assert!(CamConfig::from_file(file.path()).is_err());
    }
}
