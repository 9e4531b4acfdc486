//! Alert dispatch.
//!
//! The dispatcher variant is chosen once, when it is built: a real display if one was
//! detected, otherwise a console message. A failing display degrades to the console
//! message for that alert; raising an alert never fails the caller.

use std::time::Duration;

use crate::display::{self, Display, DisplayConfig};

pub const DEFAULT_ALERT_DURATION: Duration = Duration::from_secs(2);
pub const DEFAULT_BLINK_HZ: f64 = 4.0;

/// How long and how fast an alert blinks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlertSettings {
    pub duration: Duration,
    pub blink_hz: f64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            duration: DEFAULT_ALERT_DURATION,
            blink_hz: DEFAULT_BLINK_HZ,
        }
    }
}

pub enum AlertDispatcher {
    RealDisplay(Box<dyn Display>),
    ConsoleFallback,
}

impl AlertDispatcher {
    /// Probe the configured display hardware once.
    pub fn detect(config: &DisplayConfig) -> Self {
        match display::detect(config) {
            Some(display) => Self::RealDisplay(display),
            None => Self::ConsoleFallback,
        }
    }

    pub fn with_display(display: Box<dyn Display>) -> Self {
        Self::RealDisplay(display)
    }

    pub fn is_console(&self) -> bool {
        matches!(self, Self::ConsoleFallback)
    }

    /// Blink for `duration` at `blink_hz`, then leave the display dark. Blocks until done.
    pub fn raise_alert(&mut self, duration: Duration, blink_hz: f64) {
        match self {
            Self::RealDisplay(display) => {
                if let Err(err) = display.flash(duration, blink_hz) {
                    log::warn!("{} alert failed: {:#}", display.name(), err);
                    console_alert(Some(display.name()));
                }
            }
            Self::ConsoleFallback => console_alert(None),
        }
    }

    /// Return the display to its quiescent state. No-op on the console.
    pub fn clear(&mut self) {
        if let Self::RealDisplay(display) = self {
            if let Err(err) = display.clear() {
                log::warn!("{} clear failed: {:#}", display.name(), err);
            }
        }
    }
}

fn console_alert(failed_display: Option<&str>) {
    match failed_display {
        Some(name) => println!("[ALERT] INTRUDER ALERT ({} unavailable)", name),
        None => println!("[ALERT] INTRUDER ALERT (no display detected)"),
    }
}
