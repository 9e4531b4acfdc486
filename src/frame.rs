//! Grayscale frame container.
//!
//! - `Frame`: immutable intensity matrix. Pixels are private; there is no mutable accessor.
//! - `FrameSize`: requested capture dimensions handed to the camera.
//!
//! Intensities are stored as `i32` so that subtracting two frames can never overflow,
//! whatever the source bit depth was.

use anyhow::{anyhow, Result};
use image::GrayImage;

/// Default capture width (matches the still configuration of the Pi camera).
pub const DEFAULT_WIDTH: u32 = 640;

/// Default capture height.
pub const DEFAULT_HEIGHT: u32 = 480;

/// Requested capture size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

// ----------------------------------------------------------------------------
// Frame: immutable grayscale matrix
// ----------------------------------------------------------------------------

/// A captured grayscale frame, stored row-major.
///
/// Frames are immutable once built. Ownership moves to whichever component consumes
/// the frame (the baseline store, or the monitor for a single comparison).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Row-major intensities. Length is always `width * height`.
    pixels: Vec<i32>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Build a frame from row-major intensities.
    pub fn new(width: u32, height: u32, pixels: Vec<i32>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "frame length mismatch: expected {} ({}x{}), got {}",
                expected,
                width,
                height,
                pixels.len()
            ));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// A frame where every pixel has the same intensity.
    pub fn filled(width: u32, height: u32, value: i32) -> Self {
        Self {
            pixels: vec![value; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Build a frame from nested rows. All rows must have the same length.
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map(|row| row.as_ref().len()).unwrap_or(0) as u32;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width as usize {
                return Err(anyhow!(
                    "ragged frame: row {} has {} pixels, expected {}",
                    y,
                    row.len(),
                    width
                ));
            }
            pixels.extend_from_slice(row);
        }
        Self::new(width, height, pixels)
    }

    /// Convert an 8-bit luma image.
    pub fn from_luma(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            pixels: image.as_raw().iter().map(|&v| v as i32).collect(),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Intensity at column `x`, row `y`, or `None` outside the frame.
    pub fn get(&self, x: u32, y: u32) -> Option<i32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: u32) -> &[i32] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Copy of the top-left `width` x `height` region, clamped to the frame.
    pub fn crop(&self, width: u32, height: u32) -> Self {
        let width = width.min(self.width);
        let height = height.min(self.height);
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            pixels.extend_from_slice(&self.row(y)[..width as usize]);
        }
        Self {
            pixels,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_length_mismatch() {
        assert!(Frame::new(2, 2, vec![0; 3]).is_err());
        assert!(Frame::new(2, 2, vec![0; 4]).is_ok());
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows: Vec<Vec<i32>> = vec![vec![1, 2], vec![3]];
        assert!(Frame::from_rows(&rows).is_err());
    }

    #[test]
    fn crop_keeps_top_left_region() -> Result<()> {
        let frame = Frame::from_rows(&[[1, 2, 3], [4, 5, 6], [7, 8, 9]])?;
        let cropped = frame.crop(2, 2);
        assert_eq!(cropped, Frame::from_rows(&[[1, 2], [4, 5]])?);
        assert_eq!(frame.crop(10, 1), Frame::from_rows(&[[1, 2, 3]])?);
        Ok(())
    }

    #[test]
    fn get_is_bounds_checked() {
        let frame = Frame::filled(4, 3, 7);
        assert_eq!(frame.get(3, 2), Some(7));
        assert_eq!(frame.get(4, 0), None);
        assert_eq!(frame.get(0, 3), None);
    }

    #[test]
    fn from_luma_widens_intensities() {
        let image = GrayImage::from_raw(2, 1, vec![0, 255]).expect("valid luma buffer");
        let frame = Frame::from_luma(&image);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 1);
        assert_eq!(frame.row(0), &[0, 255]);
    }
}
