//! Tests for the acquisition loop

use ocellus_cam::acquisition;
use ocellus_cam::context::AppContext;
use ocellus_cam::hsm::MainState;
use ocellus_cam::hw::CameraRig;
use ocellus_cam::sim::{
    SimCamera, SimCameraHandle, SimJournal, SimOp, SimTransport, SimTransportHandle,
};
use ocellus_cam::sim::TickClock;
use ocellus_core::types::PARAM_GET_APP_STATE;
use ocellus_core::{CamConfig, Error, ReqStatus};
use ocellus_vision::ScanLabeler;

struct Fixture {
    ctx: AppContext,
    rig: CameraRig,
    hsm: MainState,
    camera: SimCameraHandle,
    host: SimTransportHandle,
    journal: SimJournal,
}

fn fixture() -> Fixture {
    let mut config = CamConfig::default();
    config.sensor.width = 32;
    config.sensor.height = 32;
    config.capture.timeout_ms = 1;
    config.capture.vblank_delay_us = 0;

    let journal = SimJournal::new();
    let camera = SimCamera::new(
        config.sensor.width,
        config.sensor.height,
        journal.clone(),
    );
    let camera_handle = camera.handle();
    let transport = SimTransport::new();
    let host = transport.handle();
    let rig = CameraRig {
        capture: Box::new(camera),
        transport: Box::new(transport),
        labeler: Box::new(ScanLabeler::new()),
        clock: Box::new(TickClock::new(journal.clone())),
    };
    let ctx = AppContext::new(config).unwrap();
    Fixture {
        ctx,
        rig,
        hsm: MainState::new(),
        camera: camera_handle,
        host,
        journal,
    }
}

fn prologue(f: &mut Fixture) {
    f.hsm.start(&mut f.ctx);
    f.rig.capture.setup_capture().unwrap();
    f.rig.capture.trigger().unwrap();
    f.journal.clear();
}

#[test]
fn test_requests_serviced_while_waiting_for_frame() {
    let mut f = fixture();
    prologue(&mut f);

    f.camera.queue_timeouts(2);
    f.host.push_request(PARAM_GET_APP_STATE);

    acquisition::step(&mut f.ctx, &mut f.rig, &mut f.hsm).unwrap();

    // The request was answered before the frame finally arrived
    assert_eq!(f.host.delivered().len(), 1);
    assert_eq!(f.host.delivered()[0].status, ReqStatus::AckPending);
    assert_eq!(f.camera.frames_served(), 1);
    assert_eq!(f.ctx.ipc.status, ReqStatus::Idle);
}

#[test]
fn test_color_step_rearms_before_processing() {
    let mut f = fixture();
    prologue(&mut f);

    acquisition::step(&mut f.ctx, &mut f.rig, &mut f.hsm).unwrap();

    // The pipeline work (which stamps the clock) runs after the next
    // capture is armed and triggered
    assert_eq!(
        f.journal.snapshot(),
        vec![SimOp::Read, SimOp::Setup, SimOp::Trigger, SimOp::Stamp]
    );
}

#[test]
fn test_raw_step_stamps_before_rearming() {
    let mut f = fixture();
    f.host.push_set_mode(false);
    prologue(&mut f);

    acquisition::step(&mut f.ctx, &mut f.rig, &mut f.hsm).unwrap();

    // Raw mode timestamps in the sequential phase, before the re-arm;
    // the parallel phase does nothing
    assert_eq!(
        f.journal.snapshot(),
        vec![SimOp::Read, SimOp::Stamp, SimOp::Setup, SimOp::Trigger]
    );
}

#[test]
fn test_non_timeout_capture_error_is_fatal() {
    let mut f = fixture();
    prologue(&mut f);
    f.camera.fail_reads("sensor detached");

    let result = acquisition::step(&mut f.ctx, &mut f.rig, &mut f.hsm);
    assert!(matches!(result, Err(Error::Capture(_))));
}

#[test]
fn test_run_acquires_requested_frame_count() {
    let mut f = fixture();
    acquisition::run(&mut f.ctx, &mut f.rig, &mut f.hsm, Some(3)).unwrap();

    assert_eq!(f.camera.frames_served(), 3);
    assert!(f.ctx.state.new_image_ready);
    assert!(f.ctx.state.last_capture > 0);
}

#[test]
fn test_transport_fault_does_not_stall_capture() {
    let mut f = fixture();
    prologue(&mut f);
    f.host.fail_next_check();

    acquisition::step(&mut f.ctx, &mut f.rig, &mut f.hsm).unwrap();
    assert_eq!(f.camera.frames_served(), 1);
}
