//! Intruder archive.
//!
//! Each detection moves the probe image into the archive directory as
//! `intruder_<YYYYmmdd_HHMMSS>.<ext>`. Two detections within the same second get a
//! `_1`, `_2`, ... suffix instead of overwriting the earlier file.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "intruder";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Clone, Debug)]
pub struct IntruderArchive {
    dir: PathBuf,
}

impl IntruderArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the archive directory if it is missing.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create archive directory {}", self.dir.display()))
    }

    /// Move `probe` into the archive under a name derived from `timestamp`.
    pub fn archive(&self, probe: &Path, timestamp: DateTime<Local>) -> Result<PathBuf> {
        self.prepare()?;
        let target = self.target_for(probe, timestamp);
        move_file(probe, &target)
            .with_context(|| format!("move {} to {}", probe.display(), target.display()))?;
        Ok(target)
    }

    fn target_for(&self, probe: &Path, timestamp: DateTime<Local>) -> PathBuf {
        let stamp = timestamp.format(STAMP_FORMAT).to_string();
        let extension = probe
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut candidate = self
            .dir
            .join(format!("{}_{}{}", FILE_PREFIX, stamp, extension));
        let mut counter = 1u32;
        while candidate.exists() {
            candidate = self
                .dir
                .join(format!("{}_{}_{}{}", FILE_PREFIX, stamp, counter, extension));
            counter += 1;
        }
        candidate
    }
}

/// Rename, falling back to copy + remove when the archive is on another filesystem.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)?;
    Ok(())
}
