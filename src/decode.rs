//! Image file decoding.
//!
//! Turns a stored capture into the grayscale `Frame` the comparator works on.

use anyhow::{Context, Result};
use std::path::Path;

use crate::frame::Frame;

/// Loads a stored image as a grayscale frame.
pub trait FrameDecoder {
    fn load_grayscale(&self, path: &Path) -> Result<Frame>;
}

/// Decoder backed by the `image` crate (JPEG and PNG).
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageDecoder;

impl FrameDecoder for ImageDecoder {
    fn load_grayscale(&self, path: &Path) -> Result<Frame> {
        let image = image::open(path).with_context(|| format!("decode {}", path.display()))?;
        Ok(Frame::from_luma(&image.into_luma8()))
    }
}
