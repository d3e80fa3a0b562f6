//! Host request dispatcher
//!
//! Polls the transport, maps each known parameter id to exactly one
//! state-machine event, resolves unknown ids as negative-acknowledge, and
//! flushes pending acknowledgements. Delivery may fail transiently and is
//! retried on a later cycle.

use crate::context::AppContext;
use crate::hsm::{Event, IpcEvent, MainState};
use crate::hw::{AckOutcome, CameraRig};
use ocellus_core::{ReqStatus, RequestKind, Result};
use tracing::{debug, error, warn};

/// Check for a new request and schedule its handling through the state
/// machine. Transport errors are logged and propagated without touching the
/// pending-request state.
pub fn poll_and_schedule(
    hsm: &mut MainState,
    ctx: &mut AppContext,
    rig: &mut CameraRig,
) -> Result<()> {
    let request = match rig.transport.check_request() {
        Ok(Some(request)) => request,
        Ok(None) => return Ok(()),
        Err(e) => {
            error!("IPC request check failed: {}", e);
            return Err(e);
        }
    };

    let event = match RequestKind::from_param_id(request.param_id) {
        Some(RequestKind::GetAppState) => Some(IpcEvent::GetAppState),
        Some(RequestKind::GetColorImage) => Some(IpcEvent::GetColorImage),
        Some(RequestKind::GetRawImage) => Some(IpcEvent::GetRawImage),
        Some(RequestKind::SetCaptureMode) => match request.set_color {
            Some(color) => Some(IpcEvent::SetCaptureMode(color)),
            None => {
                warn!(param_id = request.param_id, "set-capture-mode without payload");
                None
            }
        },
        None => {
            warn!(param_id = request.param_id, "unknown IPC parameter id");
            None
        }
    };

    ctx.ipc.request = Some(request);
    match event {
        Some(event) => hsm.dispatch(ctx, rig, Event::Ipc(event)),
        None => {
            // No event: the request is rejected right here
            ctx.ipc.status = ReqStatus::NackPending;
            Ok(())
        }
    }
}

/// Try to deliver the acknowledge for the most recently resolved request.
/// Safe no-op when nothing is pending.
pub fn flush_acknowledge(ctx: &mut AppContext, rig: &mut CameraRig) -> Result<()> {
    if ctx.ipc.status == ReqStatus::Idle {
        return Ok(());
    }

    let outcome = AckOutcome {
        status: ctx.ipc.status,
        response: ctx.ipc.response.as_ref(),
    };
    match rig.transport.deliver_ack(&outcome) {
        Ok(true) => {
            debug!(status = ?ctx.ipc.status, "acknowledge delivered");
            ctx.ipc.status = ReqStatus::Idle;
            ctx.ipc.request = None;
            ctx.ipc.response = None;
            Ok(())
        }
        Ok(false) => {
            // Transient; keep the pending state for the next cycle
            debug!("acknowledge not delivered yet, will retry");
            Ok(())
        }
        Err(e) => {
            error!("IPC acknowledge failed: {}", e);
            Err(e)
        }
    }
}

/// One dispatcher cycle: schedule a newly arrived request, then flush any
/// pending acknowledge (which may be left over from an earlier cycle).
pub fn handle_requests(
    hsm: &mut MainState,
    ctx: &mut AppContext,
    rig: &mut CameraRig,
) -> Result<()> {
    poll_and_schedule(hsm, ctx, rig)?;
    flush_acknowledge(ctx, rig)
}
