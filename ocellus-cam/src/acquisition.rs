//! Acquisition loop
//!
//! The sole driver of time: arms capture, waits for a frame (servicing
//! host requests while the wait times out), throws the sequential-phase
//! frame event, re-arms, then throws the parallel-phase event so the
//! CPU-bound pipeline work overlaps the hardware exposure of the next
//! frame. That ordering is a throughput requirement, not a nicety.

use crate::context::AppContext;
use crate::dispatcher;
use crate::hsm::{Event, MainState};
use crate::hw::CameraRig;
use ocellus_core::{Error, Result};
use std::time::Duration;
use tracing::{error, info, warn};

/// One full acquisition iteration: wait, sequential phase, re-arm,
/// parallel phase.
pub fn step(ctx: &mut AppContext, rig: &mut CameraRig, hsm: &mut MainState) -> Result<()> {
    let timeout = Duration::from_millis(ctx.config.capture.timeout_ms);

    // Wait for the captured picture; keep the host interface serviced
    // meanwhile. At least one request is processed per attempt.
    loop {
        if let Err(e) = dispatcher::handle_requests(hsm, ctx, rig) {
            // Transport trouble must not stall capture; retried next cycle
            warn!("request servicing failed: {}", e);
        }

        match rig.capture.read_frame(ctx.frames.write_slot_mut(), timeout) {
            Ok(()) => {
                ctx.frames.commit();
                break;
            }
            Err(Error::CaptureTimeout) => continue,
            Err(e) => {
                // A valid frame is required; anything but a timeout is
                // fatal to the iteration
                error!("capture failed: {}", e);
                return Err(e);
            }
        }
    }

    // Sequential with the next capture
    hsm.dispatch(ctx, rig, Event::FrameSeq)?;

    // Prepare the next capture
    rig.capture.setup_capture()?;
    rig.capture.trigger()?;

    // Parallel with the next capture
    hsm.dispatch(ctx, rig, Event::FramePar)?;

    Ok(())
}

/// Run the acquisition loop. `max_frames = None` runs until the process
/// terminates.
pub fn run(
    ctx: &mut AppContext,
    rig: &mut CameraRig,
    hsm: &mut MainState,
    max_frames: Option<u64>,
) -> Result<()> {
    hsm.start(ctx);

    // Prologue: initial acquisition setup
    rig.capture.setup_capture()?;
    rig.capture.trigger()?;
    info!("acquisition started");

    let mut frames: u64 = 0;
    loop {
        step(ctx, rig, hsm)?;
        frames += 1;
        if let Some(max) = max_frames {
            if frames >= max {
                info!(frames, "acquisition finished");
                return Ok(());
            }
        }
    }
}
