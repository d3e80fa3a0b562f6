//! Main state machine
//!
//! A two-level hierarchy: the root state handles start-up and supplies the
//! default for IPC events no substate consumed (negative-acknowledge), and
//! exactly one of the two leaf states — capture-color, capture-raw — is
//! active at any time. Handlers run to completion one event at a time on
//! the acquisition thread; transitions run the target's entry action
//! exactly once.

use crate::context::AppContext;
use crate::hw::{CameraRig, ResponsePayload};
use ocellus_core::{CaptureMode, GreyImage, ReqStatus, Result};
use ocellus_vision::debayer::debayer_grey_half_into;
use std::time::Duration;
use tracing::{debug, info};

/// Host-originated events, mapped from requests by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcEvent {
    GetAppState,
    GetColorImage,
    GetRawImage,
    /// Payload: true = capture color
    SetCaptureMode(bool),
}

/// Events the state machine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Frame ready; processed before the next capture is armed
    FrameSeq,
    /// Frame ready; processed in parallel with the next capture
    FramePar,
    Ipc(IpcEvent),
}

/// The closed set of leaf states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateId {
    CaptureColor,
    CaptureRaw,
}

impl StateId {
    fn mode(self) -> CaptureMode {
        match self {
            StateId::CaptureColor => CaptureMode::Color,
            StateId::CaptureRaw => CaptureMode::Raw,
        }
    }
}

/// Result of a leaf handler
enum Outcome {
    /// Event fully handled
    Consumed,
    /// Not handled here; falls through to the root
    Bubble,
    /// Handled, and the active leaf changes
    Transition(StateId),
}

/// The hierarchical state machine
pub struct MainState {
    active: StateId,
    started: bool,
}

impl MainState {
    pub fn new() -> Self {
        Self {
            // Start-up enters capture-color
            active: StateId::CaptureColor,
            started: false,
        }
    }

    /// Currently active leaf state
    pub fn active(&self) -> StateId {
        self.active
    }

    /// Run the initial state's entry action. Idempotent.
    pub fn start(&mut self, ctx: &mut AppContext) {
        if self.started {
            return;
        }
        self.started = true;
        self.enter(ctx, self.active);
    }

    /// Throw one event at the machine
    pub fn dispatch(&mut self, ctx: &mut AppContext, rig: &mut CameraRig, event: Event) -> Result<()> {
        debug_assert!(self.started, "dispatch before start");
        let outcome = match self.active {
            StateId::CaptureColor => self.handle_capture_color(ctx, rig, event)?,
            StateId::CaptureRaw => self.handle_capture_raw(ctx, rig, event)?,
        };
        match outcome {
            Outcome::Consumed => {}
            Outcome::Bubble => self.handle_top(ctx, event),
            Outcome::Transition(target) => {
                debug_assert_ne!(target, self.active);
                self.active = target;
                self.enter(ctx, target);
            }
        }
        Ok(())
    }

    /// Entry action shared by both leaves: record the mode and point the
    /// frame store back at the primary buffer
    fn enter(&mut self, ctx: &mut AppContext, state: StateId) {
        ctx.state.mode = state.mode();
        ctx.frames.reset();
        info!(state = ?state, "capture state entered");
    }

    /// Root fallback: reject IPC events no substate consumed, swallow the
    /// rest
    fn handle_top(&mut self, ctx: &mut AppContext, event: Event) {
        if let Event::Ipc(ipc) = event {
            debug!(event = ?ipc, state = ?self.active, "request not valid in this state");
            ctx.ipc.status = ReqStatus::NackPending;
        }
    }

    fn handle_capture_color(
        &mut self,
        ctx: &mut AppContext,
        rig: &mut CameraRig,
        event: Event,
    ) -> Result<Outcome> {
        match event {
            Event::FrameSeq => {
                // Respect the sensor's vertical blank time before the
                // re-trigger; color-mode work happens in the parallel phase
                vblank_pause(ctx);
                Ok(Outcome::Consumed)
            }
            Event::FramePar => {
                let AppContext {
                    config,
                    frames,
                    grey,
                    pipeline,
                    ..
                } = ctx;
                debayer_grey_half_into(
                    frames.current_frame(),
                    config.sensor.width,
                    config.sensor.height,
                    config.sensor.bayer,
                    grey,
                )?;
                pipeline.process(grey, rig.labeler.as_mut())?;
                ctx.state.last_capture = rig.clock.now();
                ctx.state.new_image_ready = true;
                Ok(Outcome::Consumed)
            }
            Event::Ipc(IpcEvent::GetAppState) => {
                ctx.ipc.response = Some(ResponsePayload::State(ctx.state));
                ctx.ipc.status = ReqStatus::AckPending;
                Ok(Outcome::Consumed)
            }
            Event::Ipc(IpcEvent::GetColorImage) => {
                ctx.ipc.response = Some(ResponsePayload::Image(ctx.grey.as_slice().to_vec()));
                ctx.state.new_image_ready = false;
                ctx.ipc.status = ReqStatus::AckPending;
                Ok(Outcome::Consumed)
            }
            Event::Ipc(IpcEvent::SetCaptureMode(color)) => {
                ctx.ipc.status = ReqStatus::AckPending;
                if color {
                    // Already capturing color; acknowledged no-op
                    Ok(Outcome::Consumed)
                } else {
                    Ok(Outcome::Transition(StateId::CaptureRaw))
                }
            }
            Event::Ipc(IpcEvent::GetRawImage) => Ok(Outcome::Bubble),
        }
    }

    fn handle_capture_raw(
        &mut self,
        ctx: &mut AppContext,
        rig: &mut CameraRig,
        event: Event,
    ) -> Result<Outcome> {
        match event {
            Event::FrameSeq => {
                ctx.state.last_capture = rig.clock.now();
                ctx.state.new_image_ready = true;
                vblank_pause(ctx);
                Ok(Outcome::Consumed)
            }
            // Raw mode does no derived processing
            Event::FramePar => Ok(Outcome::Consumed),
            Event::Ipc(IpcEvent::GetAppState) => {
                ctx.ipc.response = Some(ResponsePayload::State(ctx.state));
                ctx.ipc.status = ReqStatus::AckPending;
                Ok(Outcome::Consumed)
            }
            Event::Ipc(IpcEvent::GetRawImage) => {
                // Debayer on demand straight into the response buffer
                let config = &ctx.config;
                let mut out = GreyImage::new(config.sensor.half_width(), config.sensor.half_height());
                debayer_grey_half_into(
                    ctx.frames.current_frame(),
                    config.sensor.width,
                    config.sensor.height,
                    config.sensor.bayer,
                    &mut out,
                )?;
                ctx.ipc.response = Some(ResponsePayload::Image(out.as_slice().to_vec()));
                ctx.state.new_image_ready = false;
                ctx.ipc.status = ReqStatus::AckPending;
                Ok(Outcome::Consumed)
            }
            Event::Ipc(IpcEvent::SetCaptureMode(color)) => {
                ctx.ipc.status = ReqStatus::AckPending;
                if color {
                    Ok(Outcome::Transition(StateId::CaptureColor))
                } else {
                    Ok(Outcome::Consumed)
                }
            }
            Event::Ipc(IpcEvent::GetColorImage) => Ok(Outcome::Bubble),
        }
    }
}

impl Default for MainState {
    fn default() -> Self {
        Self::new()
    }
}

fn vblank_pause(ctx: &AppContext) {
    let us = ctx.config.capture.vblank_delay_us;
    if us > 0 {
        std::thread::sleep(Duration::from_micros(us));
    }
}
