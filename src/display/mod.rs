//! Alert display hardware.
//!
//! Displays are best-effort: `detect` probes for hardware once at startup and returns
//! `None` when nothing usable is attached. Callers fall back to the console.

pub mod sense_hat;

use anyhow::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub use sense_hat::SenseHat;

/// Blink rates below this are clamped so the blink period stays finite.
pub const MIN_BLINK_HZ: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color { r: 0, g: 0, b: 0 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };

    /// Pack into the RGB565 layout used by small LED framebuffers.
    pub fn to_rgb565(self) -> u16 {
        let r = (self.r as u16 >> 3) & 0x1F;
        let g = (self.g as u16 >> 2) & 0x3F;
        let b = (self.b as u16 >> 3) & 0x1F;
        (r << 11) | (g << 5) | b
    }
}

/// Display configuration.
#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Set to false to force the console fallback.
    pub enabled: bool,
    /// Explicit framebuffer device; probed from sysfs when unset.
    pub framebuffer: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            framebuffer: None,
        }
    }
}

/// A display that can show a solid color.
pub trait Display {
    fn name(&self) -> &'static str;

    /// Fill the whole display with one color.
    fn fill(&mut self, color: Color) -> Result<()>;

    /// Return to the quiescent (dark) state.
    fn clear(&mut self) -> Result<()> {
        self.fill(Color::OFF)
    }

    /// Alternate red and off at `rate_hz` for `duration`, ending dark.
    fn flash(&mut self, duration: Duration, rate_hz: f64) -> Result<()> {
        let period = Duration::from_secs_f64(1.0 / rate_hz.max(MIN_BLINK_HZ));
        let half = period / 2;
        let end = Instant::now() + duration;
        while Instant::now() < end {
            self.fill(Color::RED)?;
            std::thread::sleep(half);
            self.fill(Color::OFF)?;
            std::thread::sleep(half);
        }
        self.fill(Color::OFF)
    }
}

/// Probe for display hardware. `None` means "use the console".
pub fn detect(config: &DisplayConfig) -> Option<Box<dyn Display>> {
    if !config.enabled {
        log::info!("display disabled by configuration");
        return None;
    }
    let framebuffer = match &config.framebuffer {
        Some(path) => Some(path.clone()),
        None => sense_hat::find_framebuffer(sense_hat::SYSFS_GRAPHICS),
    };
    let Some(framebuffer) = framebuffer else {
        log::info!("no Sense HAT framebuffer found; alerts go to the console");
        return None;
    };
    match SenseHat::open(&framebuffer) {
        Ok(display) => {
            log::info!("Sense HAT display on {}", framebuffer.display());
            Some(Box::new(display))
        }
        Err(err) => {
            log::warn!("Sense HAT unavailable ({:#}); alerts go to the console", err);
            None
        }
    }
}
