use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::NamedTempFile;

use home_sentinel::config::SentinelConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "SENTINEL_CONFIG",
        "SENTINEL_CAMERA",
        "SENTINEL_THRESHOLD",
        "SENTINEL_INTERVAL_SECS",
        "SENTINEL_DATA_DIR",
        "SENTINEL_DISPLAY",
    ] {
        std::env::remove_var(key);
    }
}

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");
    file
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(
        r#"{
            "data_dir": "/var/lib/sentinel",
            "countdown_secs": 3,
            "camera": {
                "source": "/dev/video0",
                "width": 320,
                "height": 240,
                "warm_up_ms": 750
            },
            "detection": {
                "threshold": 750000,
                "interval_secs": 5
            },
            "alert": {
                "duration_ms": 1500,
                "blink_hz": 2.0
            },
            "display": {
                "enabled": true,
                "framebuffer": "/dev/fb1"
            }
        }"#,
    );

    std::env::set_var("SENTINEL_CONFIG", file.path());
    std::env::set_var("SENTINEL_CAMERA", "stub://porch");
    std::env::set_var("SENTINEL_INTERVAL_SECS", "9");

    let cfg = SentinelConfig::load().expect("load config");

    assert_eq!(
        cfg.paths.baseline,
        PathBuf::from("/var/lib/sentinel/images/background.jpg")
    );
    assert_eq!(cfg.paths.probe, PathBuf::from("/var/lib/sentinel/images/test.jpg"));
    assert_eq!(
        cfg.paths.archive_dir,
        PathBuf::from("/var/lib/sentinel/images/intruders")
    );
    assert_eq!(cfg.camera.source, "stub://porch");
    assert_eq!(cfg.camera.size.width, 320);
    assert_eq!(cfg.camera.size.height, 240);
    assert_eq!(cfg.camera.warm_up, Duration::from_millis(750));
    assert_eq!(cfg.detection.threshold, 750_000);
    assert_eq!(cfg.detection.interval, Duration::from_secs(9));
    assert_eq!(cfg.alert.duration, Duration::from_millis(1500));
    assert_eq!(cfg.alert.blink_hz, 2.0);
    assert_eq!(cfg.display.framebuffer, Some(PathBuf::from("/dev/fb1")));
    assert_eq!(cfg.countdown, Duration::from_secs(3));

    clear_env();
}

#[test]
fn explicit_paths_override_data_dir_layout() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(
        r#"{
            "paths": {
                "baseline": "/srv/cam/empty.png",
                "archive_dir": "/srv/cam/caught"
            }
        }"#,
    );

    let cfg = SentinelConfig::load_from(Some(file.path())).expect("load config");

    assert_eq!(cfg.paths.baseline, PathBuf::from("/srv/cam/empty.png"));
    assert_eq!(cfg.paths.probe, PathBuf::from("data/images/test.jpg"));
    assert_eq!(cfg.paths.archive_dir, PathBuf::from("/srv/cam/caught"));

    clear_env();
}

#[test]
fn env_data_dir_and_display_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SENTINEL_DATA_DIR", "/tmp/sentinel");
    std::env::set_var("SENTINEL_DISPLAY", "off");
    std::env::set_var("SENTINEL_THRESHOLD", "1234");

    let cfg = SentinelConfig::load().expect("load config");

    assert_eq!(
        cfg.paths.baseline,
        PathBuf::from("/tmp/sentinel/images/background.jpg")
    );
    assert!(!cfg.display.enabled);
    assert_eq!(cfg.detection.threshold, 1234);
    assert_eq!(cfg.monitor_settings().threshold, 1234);

    std::env::set_var("SENTINEL_DISPLAY", "/dev/fb3");
    let cfg = SentinelConfig::load().expect("load config");
    assert!(cfg.display.enabled);
    assert_eq!(cfg.display.framebuffer, Some(PathBuf::from("/dev/fb3")));

    clear_env();
}

#[test]
fn rejects_invalid_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SENTINEL_THRESHOLD", "0");
    assert!(SentinelConfig::load().is_err());
    std::env::set_var("SENTINEL_THRESHOLD", "lots");
    assert!(SentinelConfig::load().is_err());
    clear_env();

    std::env::set_var("SENTINEL_INTERVAL_SECS", "0");
    assert!(SentinelConfig::load().is_err());
    std::env::set_var("SENTINEL_INTERVAL_SECS", "9223372036854775807");
    assert!(SentinelConfig::load().is_err());
    clear_env();

    let file = write_config(r#"{ "alert": { "blink_hz": 0.0 } }"#);
    assert!(SentinelConfig::load_from(Some(file.path())).is_err());

    let file = write_config("{ not json");
    let err = SentinelConfig::load_from(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("invalid config file"));

    clear_env();
}
