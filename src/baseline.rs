//! Baseline ("empty room") reference frame.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::capture::Camera;
use crate::decode::FrameDecoder;
use crate::error::MonitorError;
use crate::frame::{Frame, FrameSize};

/// Holds the reference frame and the well-known file it is captured to.
pub struct BaselineStore {
    path: PathBuf,
    frame: Option<Frame>,
}

impl BaselineStore {
    /// An empty store that will capture to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frame: None,
        }
    }

    /// Like `new`, but picks up a baseline left on disk by an earlier run.
    ///
    /// An unreadable file is logged and ignored; the operator can recapture.
    pub fn open(path: impl Into<PathBuf>, decoder: &dyn FrameDecoder) -> Self {
        let mut store = Self::new(path);
        if store.path.exists() {
            match decoder.load_grayscale(&store.path) {
                Ok(frame) => {
                    log::info!(
                        "loaded baseline {} ({}x{})",
                        store.path.display(),
                        frame.width(),
                        frame.height()
                    );
                    store.frame = Some(frame);
                }
                Err(err) => {
                    log::warn!(
                        "ignoring unreadable baseline {}: {:#}",
                        store.path.display(),
                        err
                    );
                }
            }
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Capture a new reference frame, replacing any previous one.
    pub fn capture_baseline(
        &mut self,
        camera: &mut dyn Camera,
        decoder: &dyn FrameDecoder,
        size: FrameSize,
    ) -> Result<&Frame> {
        let written = camera.capture(&self.path, size)?;
        let frame = decoder.load_grayscale(&written)?;
        log::info!(
            "baseline captured to {} ({}x{})",
            written.display(),
            frame.width(),
            frame.height()
        );
        Ok(self.frame.insert(frame))
    }

    pub fn has_baseline(&self) -> bool {
        self.frame.is_some()
    }

    pub fn get_baseline(&self) -> Result<&Frame, MonitorError> {
        self.frame.as_ref().ok_or(MonitorError::NotReady)
    }
}
