//! Collaborator contracts for the capture driver, host transport and clock
//!
//! The core never talks to hardware directly; everything below is consumed
//! through these traits. The simulation rig in [`crate::sim`] implements
//! them deterministically, real drivers live out of tree.

use ocellus_core::{AppState, ReqStatus, Result};
use std::time::{Duration, Instant};

/// Capture driver contract.
///
/// The usage protocol is arm (`setup_capture`), fire (`trigger`), then
/// collect (`read_frame`). A timeout from `read_frame` is the sole
/// non-fatal failure; it surfaces as [`ocellus_core::Error::CaptureTimeout`]
/// and the caller retries after servicing requests.
pub trait CaptureControl {
    /// Prepare the driver for the next exposure
    fn setup_capture(&mut self) -> Result<()>;

    /// Fire the exposure trigger
    fn trigger(&mut self) -> Result<()>;

    /// Wait up to `timeout` for the armed capture and copy the raw frame
    /// into `frame`
    fn read_frame(&mut self, frame: &mut [u8], timeout: Duration) -> Result<()>;
}

/// A host request as reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRequest {
    /// Raw parameter id; unknown values resolve to negative-acknowledge
    pub param_id: u32,
    /// Payload of a set-capture-mode request (true = color)
    pub set_color: Option<bool>,
}

/// Response data delivered together with an acknowledge
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Application state snapshot (query-state)
    State(AppState),
    /// Half-resolution pixel buffer (color- or raw-image query)
    Image(Vec<u8>),
}

/// Resolution of the most recent request, handed to the transport for
/// delivery
#[derive(Debug)]
pub struct AckOutcome<'a> {
    pub status: ReqStatus,
    pub response: Option<&'a ResponsePayload>,
}

/// Host request/acknowledge transport contract
pub trait RequestTransport {
    /// Poll for a newly arrived request. `Ok(None)` means no message is
    /// available and is not an error.
    fn check_request(&mut self) -> Result<Option<HostRequest>>;

    /// Attempt to deliver the acknowledge (or negative-acknowledge) for the
    /// most recently resolved request. `Ok(false)` reports a transient
    /// delivery failure; the caller retries on a later cycle. Idempotent
    /// and retry-safe.
    fn deliver_ack(&mut self, outcome: &AckOutcome<'_>) -> Result<bool>;
}

/// Monotonic cycle counter
pub trait CycleClock {
    fn now(&mut self) -> u64;
}

/// Wall-clock-backed cycle counter for production use
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleClock for MonotonicClock {
    fn now(&mut self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }
}

/// The full set of collaborators the controller drives
pub struct CameraRig {
    pub capture: Box<dyn CaptureControl>,
    pub transport: Box<dyn RequestTransport>,
    pub labeler: Box<dyn ocellus_vision::RegionLabeler>,
    pub clock: Box<dyn CycleClock>,
}
