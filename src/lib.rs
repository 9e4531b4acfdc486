//! Home Sentinel
//!
//! A single-camera intrusion monitor. The operator captures a baseline of the empty
//! room, arms the system, and every interval a new still is scored against the
//! baseline. A score above the threshold raises an alert and archives the still.
//!
//! # Module Structure
//!
//! - `frame`: grayscale frame container
//! - `compare`: difference score and detection predicate
//! - `baseline`: reference frame store
//! - `monitor`: detection loop and Idle/Armed/Alerting state machine
//! - `alert`, `display`: alert rendering on a Sense HAT or the console
//! - `archive`: timestamped intruder images
//! - `capture`, `decode`: camera and image-file collaborators
//! - `cancel`, `menu`, `ui`, `config`: operator surface and runtime settings

pub mod alert;
pub mod archive;
pub mod baseline;
pub mod cancel;
pub mod capture;
pub mod compare;
pub mod config;
pub mod decode;
pub mod display;
pub mod error;
pub mod frame;
pub mod menu;
pub mod monitor;
pub mod ui;

pub use alert::{AlertDispatcher, AlertSettings};
pub use archive::IntruderArchive;
pub use baseline::BaselineStore;
pub use cancel::CancelToken;
pub use capture::{open_camera, Camera, CameraConfig, Shutdown, SyntheticCamera};
pub use compare::{detected, evaluate, score, DiffScore, Verdict};
pub use decode::{FrameDecoder, ImageDecoder};
pub use display::{Display, DisplayConfig};
pub use error::MonitorError;
pub use frame::{Frame, FrameSize};
pub use monitor::{
    DetectionEvent, Monitor, MonitorSettings, SessionExit, SessionReport, SystemState,
};
