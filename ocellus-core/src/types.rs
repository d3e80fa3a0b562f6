//! Core types shared between the controller and the frame pipeline

use serde::{Deserialize, Serialize};

/// Host parameter id: query the application state snapshot.
pub const PARAM_GET_APP_STATE: u32 = 1;
/// Host parameter id: fetch the annotated color-path image.
pub const PARAM_GET_COLOR_IMG: u32 = 2;
/// Host parameter id: fetch the raw-path image (debayered on demand).
pub const PARAM_GET_RAW_IMG: u32 = 3;
/// Host parameter id: select the capture mode (payload: true = color).
pub const PARAM_SET_CAPTURE_MODE: u32 = 4;

/// Active capture mode, one per leaf state of the main state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureMode {
    /// Frames are debayered and run through the segmentation pipeline
    Color,
    /// Frames pass through as raw sensor data, debayered only on request
    Raw,
}

/// Application state snapshot exposed to the host interface.
///
/// Single writer: mutated only inside state-machine event handlers, which
/// execute one at a time on the acquisition thread. The dispatcher reads it
/// to answer state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Current capture mode
    pub mode: CaptureMode,
    /// Set when a frame finished processing, cleared when the host fetches it
    pub new_image_ready: bool,
    /// Cycle-counter timestamp of the last completed capture
    pub last_capture: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Color,
            new_image_ready: false,
            last_capture: 0,
        }
    }
}

/// Pending-request lifecycle.
///
/// Idle -> (request resolved) -> AckPending | NackPending -> (delivery
/// confirmed, possibly after several attempts) -> Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReqStatus {
    #[default]
    Idle,
    AckPending,
    NackPending,
}

/// The closed set of host requests the dispatcher understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    GetAppState,
    GetColorImage,
    GetRawImage,
    SetCaptureMode,
}

impl RequestKind {
    /// Map a transport parameter id to a request kind. Unknown ids yield
    /// `None` and are resolved as negative-acknowledge by the dispatcher.
    pub fn from_param_id(id: u32) -> Option<Self> {
        match id {
            PARAM_GET_APP_STATE => Some(RequestKind::GetAppState),
            PARAM_GET_COLOR_IMG => Some(RequestKind::GetColorImage),
            PARAM_GET_RAW_IMG => Some(RequestKind::GetRawImage),
            PARAM_SET_CAPTURE_MODE => Some(RequestKind::SetCaptureMode),
            _ => None,
        }
    }
}

/// Bayer mosaic ordering of the first sensor row pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BayerOrder {
    /// Blue-green rows first (BGBG / GRGR)
    Bgbg,
    /// Green-blue rows first (GBGB / RGRG)
    Gbgb,
    /// Green-red rows first (GRGR / BGBG)
    Grgr,
    /// Red-green rows first (RGRG / GBGB)
    Rgrg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_default() {
        let state = AppState::default();
        assert_eq!(state.mode, CaptureMode::Color);
        assert!(!state.new_image_ready);
        assert_eq!(state.last_capture, 0);
    }

    #[test]
    fn test_request_kind_mapping() {
        assert_eq!(
            RequestKind::from_param_id(PARAM_GET_APP_STATE),
            Some(RequestKind::GetAppState)
        );
        assert_eq!(
            RequestKind::from_param_id(PARAM_GET_COLOR_IMG),
            Some(RequestKind::GetColorImage)
        );
        assert_eq!(
            RequestKind::from_param_id(PARAM_GET_RAW_IMG),
            Some(RequestKind::GetRawImage)
        );
        assert_eq!(
            RequestKind::from_param_id(PARAM_SET_CAPTURE_MODE),
            Some(RequestKind::SetCaptureMode)
        );
        assert_eq!(RequestKind::from_param_id(0), None);
        assert_eq!(RequestKind::from_param_id(999), None);
    }

    #[test]
    fn test_req_status_default_idle() {
        assert_eq!(ReqStatus::default(), ReqStatus::Idle);
    }

    #[test]
    fn test_app_state_serde_roundtrip() {
        let state = AppState {
            mode: CaptureMode::Raw,
            new_image_ready: true,
            last_capture: 1234,
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
