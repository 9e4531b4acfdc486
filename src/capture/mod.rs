//! Still-image capture.
//!
//! A `Camera` writes one still image per call to a destination path and returns that
//! path. The device behind it is opened lazily on the first capture, reused for every
//! later capture, and released by an explicit `shutdown`.
//!
//! Sources:
//! - `stub://<name>` synthetic scene (testing, demos)
//! - V4L2 devices such as `/dev/video0` (feature: capture-v4l2)

pub mod synthetic;
#[cfg(feature = "capture-v4l2")]
pub mod v4l2;

use anyhow::{anyhow, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::frame::FrameSize;

pub use synthetic::SyntheticCamera;
#[cfg(feature = "capture-v4l2")]
pub use v4l2::V4l2Camera;

/// Warm-up after the device starts, letting exposure and white balance settle.
pub const DEFAULT_WARM_UP: Duration = Duration::from_millis(500);

/// Configuration for a capture source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Source locator: `stub://name[?intruder_every=N]` or a device path.
    pub source: String,
    pub size: FrameSize,
    pub warm_up: Duration,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: "stub://living_room".to_string(),
            size: FrameSize::default(),
            warm_up: DEFAULT_WARM_UP,
        }
    }
}

/// Outcome of a best-effort camera shutdown. Shutdown never fails the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shutdown {
    /// The device was open and has been stopped.
    Closed,
    /// Nothing to do; the device was never opened (or already closed).
    NotOpen,
    /// Stopping the device reported an error; the handle was released anyway.
    Failed(String),
}

impl fmt::Display for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shutdown::Closed => write!(f, "closed"),
            Shutdown::NotOpen => write!(f, "not open"),
            Shutdown::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Still-image capture device.
pub trait Camera {
    /// Capture a still image to `destination` and return the written path.
    ///
    /// `size` is applied when the device is first opened.
    fn capture(&mut self, destination: &Path, size: FrameSize) -> Result<PathBuf>;

    /// Stop the device. Logs problems instead of returning them.
    fn shutdown(&mut self) -> Shutdown;
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    fn capture(&mut self, destination: &Path, size: FrameSize) -> Result<PathBuf> {
        (**self).capture(destination, size)
    }

    fn shutdown(&mut self) -> Shutdown {
        (**self).shutdown()
    }
}

/// Select a camera implementation from the configured source.
pub fn open_camera(config: CameraConfig) -> Result<Box<dyn Camera>> {
    if config.source.trim().is_empty() {
        return Err(anyhow!("camera source must not be empty"));
    }
    if config.source.starts_with("stub://") {
        return Ok(Box::new(SyntheticCamera::from_config(config)?));
    }
    if config.source.contains("://") {
        return Err(anyhow!(
            "unsupported camera source {}; expected stub:// or a local device path",
            config.source
        ));
    }
    #[cfg(feature = "capture-v4l2")]
    {
        Ok(Box::new(V4l2Camera::new(config)))
    }
    #[cfg(not(feature = "capture-v4l2"))]
    {
        Err(anyhow!(
            "device capture ({}) requires the capture-v4l2 feature",
            config.source
        ))
    }
}

/// Create the destination's parent directory if it does not exist yet.
pub(crate) fn ensure_parent(destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(source: &str) -> CameraConfig {
        CameraConfig {
            source: source.to_string(),
            warm_up: Duration::ZERO,
            ..CameraConfig::default()
        }
    }

    #[test]
    fn stub_source_opens_synthetic_camera() {
        assert!(open_camera(config("stub://porch")).is_ok());
    }

    #[test]
    fn rejects_network_and_empty_sources() {
        assert!(open_camera(config("rtsp://camera-1/stream")).is_err());
        assert!(open_camera(config("  ")).is_err());
    }

    #[test]
    fn shutdown_display_is_readable() {
        assert_eq!(Shutdown::Closed.to_string(), "closed");
        assert_eq!(
            Shutdown::Failed("busy".to_string()).to_string(),
            "failed: busy"
        );
    }
}
