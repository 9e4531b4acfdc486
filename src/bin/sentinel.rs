//! sentinel - interactive home intrusion monitor
//!
//! This binary:
//! 1. Loads settings (JSON config file, env overrides, command-line overrides)
//! 2. Opens the camera lazily and probes for a Sense HAT display once
//! 3. Runs the operator menu on stdin/stdout until the operator quits
//! 4. Releases the camera on exit

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use home_sentinel::config::SentinelConfig;
use home_sentinel::menu::{self, MenuContext};
use home_sentinel::monitor::{MAX_INTERVAL_SECS, MIN_INTERVAL_SECS, MIN_THRESHOLD};
use home_sentinel::ui::Ui;
use home_sentinel::{
    open_camera, AlertDispatcher, BaselineStore, CancelToken, ImageDecoder, IntruderArchive,
    Monitor, Shutdown,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON configuration file.
    #[arg(long, env = "SENTINEL_CONFIG")]
    config: Option<PathBuf>,
    /// Camera source (`stub://name` or a device path such as /dev/video0).
    #[arg(long)]
    camera: Option<String>,
    /// Starting detection threshold.
    #[arg(long)]
    threshold: Option<u64>,
    /// Starting seconds between captures.
    #[arg(long)]
    interval: Option<u64>,
    /// Countdown before background capture and arming, in seconds.
    #[arg(long)]
    countdown: Option<u64>,
    /// Never use the Sense HAT; alerts go to the console.
    #[arg(long)]
    no_display: bool,
    /// Output style: plain or pretty (defaults to pretty on a terminal).
    #[arg(long, value_parser = ["plain", "pretty"])]
    ui: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = SentinelConfig::load_from(args.config.as_deref())?;
    if let Some(source) = args.camera {
        cfg.camera.source = source;
    }
    if let Some(threshold) = args.threshold {
        cfg.detection.threshold = threshold.max(MIN_THRESHOLD);
    }
    if let Some(interval) = args.interval {
        cfg.detection.interval =
            Duration::from_secs(interval.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS));
    }
    if let Some(countdown) = args.countdown {
        cfg.countdown = Duration::from_secs(countdown);
    }
    if args.no_display {
        cfg.display.enabled = false;
    }

    log::info!(
        "camera {} at {}x{}, threshold {}, interval {}s",
        cfg.camera.source,
        cfg.camera.size.width,
        cfg.camera.size.height,
        cfg.detection.threshold,
        cfg.detection.interval.as_secs()
    );

    let decoder = ImageDecoder;
    let mut camera = open_camera(cfg.camera.clone())?;
    let baseline = BaselineStore::open(&cfg.paths.baseline, &decoder);
    if baseline.has_baseline() {
        log::info!("loaded background image {}", cfg.paths.baseline.display());
    }
    let dispatcher = AlertDispatcher::detect(&cfg.display);
    if dispatcher.is_console() {
        log::info!("no Sense HAT detected; alerts will be printed to the console");
    }
    let mut monitor = Monitor::new(
        cfg.monitor_settings(),
        baseline,
        IntruderArchive::new(&cfg.paths.archive_dir),
        dispatcher,
        &cfg.paths.probe,
    );

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_listening() {
            handler_token.cancel();
        } else {
            log::info!("interrupted at menu; exiting");
            std::process::exit(130);
        }
    })
    .context("error setting Ctrl-C handler")?;

    let ui = Ui::from_args(args.ui.as_deref(), std::io::stderr().is_terminal());
    let ctx = MenuContext {
        monitor: &mut monitor,
        camera: camera.as_mut(),
        decoder: &decoder,
        cancel: &cancel,
        ui: &ui,
        countdown: cfg.countdown,
    };
    let stdin = std::io::stdin();
    let result = menu::run(ctx, stdin.lock(), std::io::stdout());

    match camera.shutdown() {
        Shutdown::Failed(reason) => log::warn!("camera shutdown failed: {}", reason),
        outcome => log::debug!("camera shutdown: {}", outcome),
    }
    result
}
