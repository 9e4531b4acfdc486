use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::alert::{AlertSettings, DEFAULT_ALERT_DURATION, DEFAULT_BLINK_HZ};
use crate::capture::{CameraConfig, DEFAULT_WARM_UP};
use crate::display::DisplayConfig;
use crate::frame::{FrameSize, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::monitor::{
    MonitorSettings, DEFAULT_INTERVAL, DEFAULT_THRESHOLD, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS,
};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_CAMERA_SOURCE: &str = "stub://living_room";
const DEFAULT_COUNTDOWN_SECS: u64 = 5;

const BASELINE_FILE: &str = "background.jpg";
const PROBE_FILE: &str = "test.jpg";
const ARCHIVE_DIR: &str = "intruders";

#[derive(Debug, Deserialize, Default)]
struct SentinelConfigFile {
    data_dir: Option<PathBuf>,
    countdown_secs: Option<u64>,
    paths: Option<PathsConfigFile>,
    camera: Option<CameraConfigFile>,
    detection: Option<DetectionConfigFile>,
    alert: Option<AlertConfigFile>,
    display: Option<DisplayConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct PathsConfigFile {
    baseline: Option<PathBuf>,
    probe: Option<PathBuf>,
    archive_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    source: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    warm_up_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectionConfigFile {
    threshold: Option<u64>,
    interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct AlertConfigFile {
    duration_ms: Option<u64>,
    blink_hz: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct DisplayConfigFile {
    enabled: Option<bool>,
    framebuffer: Option<PathBuf>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct SentinelConfig {
    pub paths: PathSettings,
    pub camera: CameraConfig,
    pub detection: DetectionSettings,
    pub alert: AlertSettings,
    pub display: DisplayConfig,
    pub countdown: Duration,
}

/// On-disk layout: fixed baseline file, transient probe file, archive directory.
#[derive(Debug, Clone)]
pub struct PathSettings {
    pub baseline: PathBuf,
    pub probe: PathBuf,
    pub archive_dir: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct DetectionSettings {
    pub threshold: u64,
    pub interval: Duration,
}

impl SentinelConfig {
    /// Load from `SENTINEL_CONFIG` (JSON, optional), then apply env overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SENTINEL_CONFIG").ok().map(PathBuf::from);
        Self::load_from(config_path.as_deref())
    }

    /// Load from an explicit JSON file (optional), then apply env overrides.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let file_cfg = match config_path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Settings handed to the monitor.
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            threshold: self.detection.threshold,
            interval: self.detection.interval,
            alert: self.alert,
            frame_size: self.camera.size,
        }
    }

    fn from_file(file: SentinelConfigFile) -> Self {
        let data_dir = file
            .data_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let images_dir = data_dir.join("images");
        let paths_file = file.paths.unwrap_or_default();
        let paths = PathSettings {
            baseline: paths_file
                .baseline
                .unwrap_or_else(|| images_dir.join(BASELINE_FILE)),
            probe: paths_file
                .probe
                .unwrap_or_else(|| images_dir.join(PROBE_FILE)),
            archive_dir: paths_file
                .archive_dir
                .unwrap_or_else(|| images_dir.join(ARCHIVE_DIR)),
        };

        let camera_file = file.camera.unwrap_or_default();
        let camera = CameraConfig {
            source: camera_file
                .source
                .unwrap_or_else(|| DEFAULT_CAMERA_SOURCE.to_string()),
            size: FrameSize {
                width: camera_file.width.unwrap_or(DEFAULT_WIDTH),
                height: camera_file.height.unwrap_or(DEFAULT_HEIGHT),
            },
            warm_up: camera_file
                .warm_up_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_WARM_UP),
        };

        let detection = DetectionSettings {
            threshold: file
                .detection
                .as_ref()
                .and_then(|detection| detection.threshold)
                .unwrap_or(DEFAULT_THRESHOLD),
            interval: file
                .detection
                .as_ref()
                .and_then(|detection| detection.interval_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_INTERVAL),
        };

        let alert = AlertSettings {
            duration: file
                .alert
                .as_ref()
                .and_then(|alert| alert.duration_ms)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_ALERT_DURATION),
            blink_hz: file
                .alert
                .as_ref()
                .and_then(|alert| alert.blink_hz)
                .unwrap_or(DEFAULT_BLINK_HZ),
        };

        let display_file = file.display.unwrap_or_default();
        let display = DisplayConfig {
            enabled: display_file.enabled.unwrap_or(true),
            framebuffer: display_file.framebuffer,
        };

        Self {
            paths,
            camera,
            detection,
            alert,
            display,
            countdown: Duration::from_secs(file.countdown_secs.unwrap_or(DEFAULT_COUNTDOWN_SECS)),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("SENTINEL_DATA_DIR") {
            if !dir.trim().is_empty() {
                let images_dir = PathBuf::from(dir).join("images");
                self.paths = PathSettings {
                    baseline: images_dir.join(BASELINE_FILE),
                    probe: images_dir.join(PROBE_FILE),
                    archive_dir: images_dir.join(ARCHIVE_DIR),
                };
            }
        }
        if let Ok(source) = std::env::var("SENTINEL_CAMERA") {
            if !source.trim().is_empty() {
                self.camera.source = source;
            }
        }
        if let Ok(threshold) = std::env::var("SENTINEL_THRESHOLD") {
            self.detection.threshold = threshold
                .trim()
                .parse()
                .map_err(|_| anyhow!("SENTINEL_THRESHOLD must be a positive integer"))?;
        }
        if let Ok(interval) = std::env::var("SENTINEL_INTERVAL_SECS") {
            let seconds: u64 = interval.trim().parse().map_err(|_| {
                anyhow!("SENTINEL_INTERVAL_SECS must be an integer number of seconds")
            })?;
            self.detection.interval = Duration::from_secs(seconds);
        }
        if let Ok(display) = std::env::var("SENTINEL_DISPLAY") {
            match display.trim() {
                "off" | "none" | "console" => self.display.enabled = false,
                "" | "auto" => {}
                path => {
                    self.display.enabled = true;
                    self.display.framebuffer = Some(PathBuf::from(path));
                }
            }
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.detection.threshold == 0 {
            return Err(anyhow!("threshold must be greater than zero"));
        }
        let interval = self.detection.interval.as_secs();
        if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&interval) {
            return Err(anyhow!(
                "interval must be between {} and {} seconds, got {}",
                MIN_INTERVAL_SECS,
                MAX_INTERVAL_SECS,
                interval
            ));
        }
        if self.camera.size.width == 0 || self.camera.size.height == 0 {
            return Err(anyhow!("camera width and height must be non-zero"));
        }
        if !self.alert.blink_hz.is_finite() || self.alert.blink_hz <= 0.0 {
            return Err(anyhow!("alert blink_hz must be a positive number"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<SentinelConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_data_dir_layout() {
        let cfg = SentinelConfig::from_file(SentinelConfigFile::default());
        assert_eq!(cfg.paths.baseline, PathBuf::from("data/images/background.jpg"));
        assert_eq!(cfg.paths.probe, PathBuf::from("data/images/test.jpg"));
        assert_eq!(cfg.paths.archive_dir, PathBuf::from("data/images/intruders"));
        assert_eq!(cfg.detection.threshold, 5_000_000);
        assert_eq!(cfg.detection.interval, Duration::from_secs(2));
        assert_eq!(cfg.alert.duration, Duration::from_secs(2));
        assert_eq!(cfg.countdown, Duration::from_secs(5));
        assert_eq!(cfg.camera.warm_up, Duration::from_millis(500));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut cfg = SentinelConfig::from_file(SentinelConfigFile {
            detection: Some(DetectionConfigFile {
                threshold: None,
                interval_secs: Some(0),
            }),
            ..SentinelConfigFile::default()
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn interval_beyond_one_day_is_rejected() {
        let mut cfg = SentinelConfig::from_file(SentinelConfigFile {
            detection: Some(DetectionConfigFile {
                threshold: None,
                interval_secs: Some(i64::MAX as u64),
            }),
            ..SentinelConfigFile::default()
        });
        assert!(cfg.validate().is_err());

        cfg.detection.interval = Duration::from_secs(MAX_INTERVAL_SECS);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn monitor_settings_mirror_config() {
        let cfg = SentinelConfig::from_file(SentinelConfigFile {
            camera: Some(CameraConfigFile {
                width: Some(320),
                height: Some(240),
                ..CameraConfigFile::default()
            }),
            ..SentinelConfigFile::default()
        });
        let settings = cfg.monitor_settings();
        assert_eq!(settings.frame_size.width, 320);
        assert_eq!(settings.frame_size.height, 240);
        assert_eq!(settings.threshold, cfg.detection.threshold);
    }
}
