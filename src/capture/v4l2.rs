//! V4L2 still capture.
//!
//! Opens the device on the first capture, keeps the mmap stream alive between captures,
//! and encodes each RGB buffer to the destination file (format chosen by extension).

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use ouroboros::self_referencing;
use std::path::{Path, PathBuf};

use super::{ensure_parent, Camera, CameraConfig, Shutdown};
use crate::frame::FrameSize;

/// Buffers to skip after the stream starts; the first frames are often dark.
const SETTLE_FRAMES: usize = 3;

pub struct V4l2Camera {
    config: CameraConfig,
    state: Option<V4l2State>,
    active_width: u32,
    active_height: u32,
    frame_count: u64,
}

#[self_referencing]
struct V4l2State {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

impl V4l2Camera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            active_width: config.size.width,
            active_height: config.size.height,
            config,
            state: None,
            frame_count: 0,
        }
    }

    fn open(&mut self, size: FrameSize) -> Result<()> {
        use v4l::buffer::Type;
        use v4l::io::traits::CaptureStream;
        use v4l::video::Capture;

        let device = &self.config.source;
        let mut dev = v4l::Device::with_path(device)
            .with_context(|| format!("open v4l2 device {}", device))?;
        let mut format = dev.format().context("read v4l2 format")?;
        format.width = size.width;
        format.height = size.height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match dev.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!("V4l2Camera: failed to set format on {}: {}", device, err);
                dev.format().context("read v4l2 format after set failure")?
            }
        };
        if &format.fourcc.repr != b"RGB3" {
            return Err(anyhow!(
                "v4l2 device {} does not support RGB3 (negotiated {})",
                device,
                format.fourcc
            ));
        }
        self.active_width = format.width;
        self.active_height = format.height;

        let mut state = V4l2StateTryBuilder {
            device: dev,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()?;

        if !self.config.warm_up.is_zero() {
            std::thread::sleep(self.config.warm_up);
        }
        for _ in 0..SETTLE_FRAMES {
            state
                .with_mut(|fields| fields.stream.next().map(|_| ()))
                .context("discard warm-up frame")?;
        }

        log::info!(
            "V4l2Camera: opened {} ({}x{})",
            device,
            self.active_width,
            self.active_height
        );
        self.state = Some(state);
        Ok(())
    }
}

impl Camera for V4l2Camera {
    fn capture(&mut self, destination: &Path, size: FrameSize) -> Result<PathBuf> {
        use v4l::io::traits::CaptureStream;

        if self.state.is_none() {
            self.open(size)?;
        }
        let (width, height) = (self.active_width, self.active_height);
        let state = self.state.as_mut().context("v4l2 device not open")?;
        let pixels = state
            .with_mut(|fields| fields.stream.next().map(|(buf, _meta)| buf.to_vec()))
            .context("capture v4l2 frame")?;
        self.frame_count += 1;

        let expected = width as usize * height as usize * 3;
        if pixels.len() < expected {
            return Err(anyhow!(
                "v4l2 buffer too small: expected {} bytes, got {}",
                expected,
                pixels.len()
            ));
        }
        let image = RgbImage::from_raw(width, height, pixels[..expected].to_vec())
            .ok_or_else(|| anyhow!("v4l2 buffer does not match {}x{}", width, height))?;

        ensure_parent(destination)
            .with_context(|| format!("create directory for {}", destination.display()))?;
        image
            .save(destination)
            .with_context(|| format!("write capture {}", destination.display()))?;
        Ok(destination.to_path_buf())
    }

    fn shutdown(&mut self) -> Shutdown {
        use v4l::io::traits::Stream;

        let Some(mut state) = self.state.take() else {
            return Shutdown::NotOpen;
        };
        match state.with_mut(|fields| fields.stream.stop()) {
            Ok(()) => {
                log::info!(
                    "V4l2Camera: closed {} after {} frames",
                    self.config.source,
                    self.frame_count
                );
                Shutdown::Closed
            }
            Err(err) => {
                log::warn!("V4l2Camera: stop {} failed: {}", self.config.source, err);
                Shutdown::Failed(err.to_string())
            }
        }
    }
}
