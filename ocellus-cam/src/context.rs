//! Shared application context
//!
//! All mutable process state lives in one explicit struct passed by
//! reference into the state-machine handlers and the dispatcher. Single
//! writer per field: everything is mutated on the acquisition thread only,
//! one event at a time, which is what makes the snapshot reads safe
//! without locks.

use crate::hw::{HostRequest, ResponsePayload};
use ocellus_core::{AppState, CamConfig, GreyImage, ReqStatus, Result};
use ocellus_vision::FramePipeline;

/// Arena of preallocated raw frame buffers indexed by slot.
///
/// One slot is "current" (the frame the state machine reads); the next
/// capture lands in the following slot so CPU work can overlap the
/// hardware exposure. No consumer may hold a frame reference across a
/// re-trigger.
pub struct FrameStore {
    slots: Vec<Vec<u8>>,
    current: usize,
}

impl FrameStore {
    pub fn new(slot_count: usize, frame_len: usize) -> Self {
        Self {
            slots: (0..slot_count).map(|_| vec![0; frame_len]).collect(),
            current: 0,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot holding the current frame
    pub fn current_slot(&self) -> usize {
        self.current
    }

    /// The frame the state machine operates on
    pub fn current_frame(&self) -> &[u8] {
        &self.slots[self.current]
    }

    /// Buffer the next capture is read into
    pub fn write_slot_mut(&mut self) -> &mut [u8] {
        let next = (self.current + 1) % self.slots.len();
        &mut self.slots[next]
    }

    /// Make the freshly read slot current
    pub fn commit(&mut self) {
        self.current = (self.current + 1) % self.slots.len();
    }

    /// Point back at the primary buffer (state-entry action)
    pub fn reset(&mut self) {
        self.current = 0;
    }
}

/// Pending host-request record
#[derive(Default)]
pub struct IpcState {
    /// The in-flight request, if any
    pub request: Option<HostRequest>,
    /// Acknowledge lifecycle of that request
    pub status: ReqStatus,
    /// Response data to deliver together with the acknowledge
    pub response: Option<ResponsePayload>,
}

/// Everything the controller mutates, in one place
pub struct AppContext {
    pub config: CamConfig,
    /// Snapshot served to state queries; written only by state handlers
    pub state: AppState,
    /// Raw sensor frames
    pub frames: FrameStore,
    /// Debayered working image; carries the annotations after processing
    pub grey: GreyImage,
    pub pipeline: FramePipeline,
    pub ipc: IpcState,
}

impl AppContext {
    pub fn new(config: CamConfig) -> Result<Self> {
        config.validate()?;
        let frame_len = config.sensor.width * config.sensor.height;
        let (half_w, half_h) = (config.sensor.half_width(), config.sensor.half_height());
        Ok(Self {
            state: AppState::default(),
            frames: FrameStore::new(config.capture.frame_slots, frame_len),
            grey: GreyImage::new(half_w, half_h),
            pipeline: FramePipeline::new(half_w, half_h, config.pipeline.clone()),
            config,
            ipc: IpcState::default(),
        })
    }
}
