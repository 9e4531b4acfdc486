//! Synthetic camera (`stub://`).
//!
//! Renders a static room with a faint per-frame flicker. With `intruder_every=N` in the
//! source query, every Nth capture also contains a bright block in the middle of the
//! scene, which is enough to trip a sensibly tuned threshold.

use anyhow::{anyhow, Context, Result};
use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};

use super::{ensure_parent, Camera, CameraConfig, Shutdown};
use crate::frame::FrameSize;

const INTRUDER_LEVEL: u8 = 250;

pub struct SyntheticCamera {
    config: CameraConfig,
    intruder_every: Option<u64>,
    started: bool,
    frame_count: u64,
}

impl SyntheticCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            intruder_every: None,
            started: false,
            frame_count: 0,
        }
    }

    /// Build from a `stub://name[?intruder_every=N]` source.
    pub fn from_config(config: CameraConfig) -> Result<Self> {
        let intruder_every = parse_intruder_every(&config.source)?;
        Ok(Self::new(config).with_intruder_every(intruder_every))
    }

    pub fn with_intruder_every(mut self, every: Option<u64>) -> Self {
        self.intruder_every = every.filter(|n| *n > 0);
        self
    }

    pub fn frames_captured(&self) -> u64 {
        self.frame_count
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn start(&mut self) {
        log::info!("SyntheticCamera: started {}", self.config.source);
        if !self.config.warm_up.is_zero() {
            std::thread::sleep(self.config.warm_up);
        }
        self.started = true;
    }

    fn render(&self, size: FrameSize) -> GrayImage {
        let intruder = self
            .intruder_every
            .is_some_and(|every| self.frame_count % every == 0);
        let flicker = (self.frame_count % 2) as u32;
        let (w, h) = (size.width, size.height);

        GrayImage::from_fn(w, h, |x, y| {
            if intruder && x >= w / 4 && x < w * 3 / 4 && y >= h / 4 && y < h * 3 / 4 {
                return Luma([INTRUDER_LEVEL]);
            }
            let base = (x * 3 + y * 5) % 200;
            Luma([(base + flicker) as u8])
        })
    }
}

impl Camera for SyntheticCamera {
    fn capture(&mut self, destination: &Path, size: FrameSize) -> Result<PathBuf> {
        if !self.started {
            self.start();
        }
        self.frame_count += 1;

        ensure_parent(destination)
            .with_context(|| format!("create directory for {}", destination.display()))?;
        self.render(size)
            .save(destination)
            .with_context(|| format!("write synthetic capture {}", destination.display()))?;
        Ok(destination.to_path_buf())
    }

    fn shutdown(&mut self) -> Shutdown {
        if !self.started {
            return Shutdown::NotOpen;
        }
        self.started = false;
        log::info!(
            "SyntheticCamera: stopped {} after {} frames",
            self.config.source,
            self.frame_count
        );
        Shutdown::Closed
    }
}

fn parse_intruder_every(source: &str) -> Result<Option<u64>> {
    let Some((_, query)) = source.split_once('?') else {
        return Ok(None);
    };
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("intruder_every=") {
            let every: u64 = value
                .parse()
                .map_err(|_| anyhow!("intruder_every must be an integer, got {:?}", value))?;
            return Ok(Some(every));
        }
    }
    Ok(None)
}
