//! diff_score - score a probe image against a background image offline
//!
//! Useful for tuning the threshold: capture a few stills with and without someone in
//! the room, then see where the scores land.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use home_sentinel::monitor::DEFAULT_THRESHOLD;
use home_sentinel::{evaluate, FrameDecoder, ImageDecoder};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Background (empty room) image.
    background: PathBuf,
    /// Image to score against the background.
    probe: PathBuf,
    /// Detection threshold; scores strictly above it count as a detection.
    #[arg(long, env = "SENTINEL_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let decoder = ImageDecoder;
    let reference = decoder.load_grayscale(&args.background)?;
    let probe = decoder.load_grayscale(&args.probe)?;
    if reference.width() != probe.width() || reference.height() != probe.height() {
        log::warn!(
            "size mismatch ({}x{} vs {}x{}); scoring the overlapping region only",
            reference.width(),
            reference.height(),
            probe.width(),
            probe.height()
        );
    }

    let verdict = evaluate(&reference, &probe, args.threshold);
    println!("diff score = {} (threshold={})", verdict.score, args.threshold);
    println!(
        "{}",
        if verdict.detected {
            "INTRUDER DETECTED"
        } else {
            "no change detected"
        }
    );
    Ok(())
}
