// Ocellus camera controller - simulation binary
//
// Runs the full control loop against the in-process simulated sensor and
// host transport, so the whole stack can be exercised on a workstation.

use clap::Parser;
use ocellus_cam::acquisition;
use ocellus_cam::context::AppContext;
use ocellus_cam::hsm::MainState;
use ocellus_cam::hw::CameraRig;
use ocellus_cam::sim::{SimCamera, SimJournal, SimSquare, SimTransport, TickClock};
use ocellus_core::CamConfig;
use ocellus_vision::label::ScanLabeler;
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "ocellus-cam", about = "Camera control loop (simulated rig)")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to acquire before exiting (default: run forever)
    #[arg(long)]
    frames: Option<u64>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let mut config = match &args.config {
        Some(path) => CamConfig::from_file(path)?,
        None => CamConfig::default(),
    };
    config.apply_env();
    config.validate()?;

    info!(
        width = config.sensor.width,
        height = config.sensor.height,
        "starting camera controller"
    );

    let journal = SimJournal::new();
    let camera = SimCamera::new(config.sensor.width, config.sensor.height, journal.clone())
        .with_square(SimSquare {
            top: config.sensor.height / 4,
            left: config.sensor.width / 4,
            size: config.sensor.height / 4,
            intensity: 220,
        })
        .with_noise(8, 42);
    let mut rig = CameraRig {
        capture: Box::new(camera),
        transport: Box::new(SimTransport::new()),
        labeler: Box::new(ScanLabeler::new()),
        clock: Box::new(TickClock::new(journal)),
    };

    let mut ctx = AppContext::new(config)?;
    let mut hsm = MainState::new();

    acquisition::run(&mut ctx, &mut rig, &mut hsm, args.frames)?;
    Ok(())
}
