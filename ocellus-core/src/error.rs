//! Error types for the Ocellus camera core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Capture driver failure other than a timeout. Fatal to the current
    /// acquisition iteration: the loop must not continue without a frame.
    #[error("Capture error: {0}")]
    Capture(String),

    /// The capture wait ran out before a frame arrived. Transient; the
    /// acquisition loop services pending requests and retries.
    #[error("Capture timed out")]
    CaptureTimeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Labeling error: {0}")]
    Labeling(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Transient conditions are retried on the next loop cycle and never
    /// surfaced as failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::CaptureTimeout)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Capture("sensor gone".to_string());
        assert!(err.to_string().contains("Capture error"));
        assert!(err.to_string().contains("sensor gone"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_timeout_is_transient() {
        assert!(Error::CaptureTimeout.is_transient());
        assert!(!Error::Capture("dead".to_string()).is_transient());
        assert!(!Error::Transport("down".to_string()).is_transient());
    }
}
