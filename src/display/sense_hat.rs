//! Raspberry Pi Sense HAT LED matrix.
//!
//! The HAT's kernel driver exposes the 8x8 matrix as a framebuffer device whose sysfs
//! name is `RPi-Sense FB`. Each pixel is one little-endian RGB565 word.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{Color, Display};

pub const SYSFS_GRAPHICS: &str = "/sys/class/graphics";

const FB_NAME: &str = "RPi-Sense FB";
const MATRIX_PIXELS: usize = 8 * 8;

pub struct SenseHat {
    framebuffer: File,
}

impl SenseHat {
    pub fn open(path: &Path) -> Result<Self> {
        let framebuffer = OpenOptions::new()
            .write(true)
            .open(path)
            .with_context(|| format!("open framebuffer {}", path.display()))?;
        Ok(Self { framebuffer })
    }
}

impl Display for SenseHat {
    fn name(&self) -> &'static str {
        "sense-hat"
    }

    fn fill(&mut self, color: Color) -> Result<()> {
        let word = color.to_rgb565().to_le_bytes();
        let mut frame = Vec::with_capacity(MATRIX_PIXELS * 2);
        for _ in 0..MATRIX_PIXELS {
            frame.extend_from_slice(&word);
        }
        self.framebuffer.seek(SeekFrom::Start(0))?;
        self.framebuffer
            .write_all(&frame)
            .context("write Sense HAT framebuffer")?;
        self.framebuffer.flush()?;
        Ok(())
    }
}

/// Find the Sense HAT framebuffer device by scanning `<sysfs_root>/fb*/name`.
pub fn find_framebuffer(sysfs_root: impl AsRef<Path>) -> Option<PathBuf> {
    let entries = std::fs::read_dir(sysfs_root.as_ref()).ok()?;
    let mut candidates: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("fb"))
        .collect();
    candidates.sort();

    candidates.into_iter().find_map(|fb| {
        let name = std::fs::read_to_string(sysfs_root.as_ref().join(&fb).join("name")).ok()?;
        (name.trim() == FB_NAME).then(|| PathBuf::from("/dev").join(&fb))
    })
}
