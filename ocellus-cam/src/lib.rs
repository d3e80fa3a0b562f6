//! ocellus-cam: control core of the Ocellus smart-camera application
//!
//! Drives capture frame by frame: the acquisition loop arms the sensor,
//! waits for frames (servicing host requests on timeout), and advances the
//! main state machine, which sequences capture-mode behavior and invokes
//! the frame pipeline. Hardware and the host transport are consumed through
//! the narrow collaborator contracts in [`hw`]; [`sim`] provides
//! deterministic in-process stand-ins.

pub mod acquisition;
pub mod context;
pub mod dispatcher;
pub mod hsm;
pub mod hw;
pub mod sim;

pub use context::AppContext;
pub use hsm::{Event, IpcEvent, MainState, StateId};
pub use hw::{CameraRig, CaptureControl, CycleClock, HostRequest, RequestTransport};
