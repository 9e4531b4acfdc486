//! Error taxonomy for the detection core.

use thiserror::Error;

/// Errors surfaced by the baseline store and the monitor.
///
/// None of these terminate the process; the menu reports them and stays live.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Arming was attempted before any baseline was captured.
    #[error("no baseline image found; capture a background first")]
    MissingBaseline,

    /// The baseline was requested but none is stored.
    #[error("baseline not ready")]
    NotReady,

    /// The camera could not produce (or the decoder could not read) a frame.
    #[error("capture failed: {0}")]
    CaptureFailure(String),

    /// The triggering frame could not be moved into the archive.
    #[error("archive failed: {0}")]
    ArchiveFailure(String),

    /// Threshold and interval may only change while the monitor is idle.
    #[error("configuration is locked while the monitor is {0}")]
    ConfigurationLocked(&'static str),
}

impl MonitorError {
    pub(crate) fn capture(err: anyhow::Error) -> Self {
        Self::CaptureFailure(format!("{:#}", err))
    }

    pub(crate) fn archive(err: anyhow::Error) -> Self {
        Self::ArchiveFailure(format!("{:#}", err))
    }
}
