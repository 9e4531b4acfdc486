//! Interactive operator menu.
//!
//! ```text
//! 1) Take new background image (empty room)
//! 2) Set sensitivity threshold
//! 3) Set monitoring interval
//! 4) Arm system (start monitoring)
//! 5) Quit
//! ```
//!
//! Bad numeric input never fails: the current value or the nearest bound is substituted and
//! the substitution is reported. Errors from the core are printed and the menu stays up.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::num::IntErrorKind;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::capture::Camera;
use crate::decode::FrameDecoder;
use crate::monitor::{
    Monitor, SessionExit, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS, MIN_THRESHOLD,
};
use crate::ui::Ui;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    CaptureBaseline,
    SetThreshold,
    SetInterval,
    Arm,
    Quit,
    Invalid(String),
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => Self::CaptureBaseline,
            "2" => Self::SetThreshold,
            "3" => Self::SetInterval,
            "4" => Self::Arm,
            "5" => Self::Quit,
            other => Self::Invalid(other.to_string()),
        }
    }
}

/// A value the operator typed that could not be used as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Substitution {
    /// Input was not a number; the current value was kept.
    Default(u64),
    /// Input was below the allowed minimum.
    Minimum(u64),
    /// Input was above the allowed maximum.
    Maximum(u64),
}

/// Parse a numeric setting into `min..=max`. Empty input keeps `current`.
pub fn parse_setting(
    input: &str,
    current: u64,
    min: u64,
    max: u64,
) -> (u64, Option<Substitution>) {
    let input = input.trim();
    if input.is_empty() {
        return (current, None);
    }
    let value = match input.parse::<i128>() {
        Ok(value) => value,
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => i128::MAX,
            IntErrorKind::NegOverflow => i128::MIN,
            _ => return (current, Some(Substitution::Default(current))),
        },
    };
    if value < i128::from(min) {
        (min, Some(Substitution::Minimum(min)))
    } else if value > i128::from(max) {
        (max, Some(Substitution::Maximum(max)))
    } else {
        (value as u64, None)
    }
}

/// Everything the menu drives.
pub struct MenuContext<'a> {
    pub monitor: &'a mut Monitor,
    pub camera: &'a mut dyn Camera,
    pub decoder: &'a dyn FrameDecoder,
    pub cancel: &'a CancelToken,
    pub ui: &'a Ui,
    pub countdown: Duration,
}

/// Run the menu until the operator quits or input ends.
pub fn run<R: BufRead, W: Write>(
    mut ctx: MenuContext<'_>,
    mut input: R,
    mut out: W,
) -> Result<()> {
    loop {
        writeln!(out, "===== Home Sentinel =====")?;
        writeln!(out, "1) Take new background image (empty room)")?;
        writeln!(out, "2) Set sensitivity threshold")?;
        writeln!(out, "3) Set monitoring interval (seconds)")?;
        writeln!(out, "4) Arm system (start monitoring)")?;
        writeln!(out, "5) Quit")?;
        let Some(line) = prompt(&mut input, &mut out, "Select option: ")? else {
            writeln!(out)?;
            break;
        };

        match MenuChoice::parse(&line) {
            MenuChoice::CaptureBaseline => take_background(&mut ctx, &mut out)?,
            MenuChoice::SetThreshold => {
                let current = ctx.monitor.settings().threshold;
                let Some(line) = prompt(
                    &mut input,
                    &mut out,
                    &format!("Enter threshold (bigger = less sensitive) [default={}]: ", current),
                )?
                else {
                    break;
                };
                let (value, note) = parse_setting(&line, current, MIN_THRESHOLD, u64::MAX);
                report_substitution(&mut out, note)?;
                match ctx.monitor.set_threshold(value) {
                    Ok(()) => writeln!(out, "Threshold set to {}\n", value)?,
                    Err(err) => writeln!(out, "{}\n", err)?,
                }
            }
            MenuChoice::SetInterval => {
                let current = ctx.monitor.settings().interval.as_secs();
                let Some(line) = prompt(
                    &mut input,
                    &mut out,
                    &format!("Enter monitoring interval (seconds) [default={}]: ", current),
                )?
                else {
                    break;
                };
                let (value, note) =
                    parse_setting(&line, current, MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
                report_substitution(&mut out, note)?;
                match ctx.monitor.set_interval(Duration::from_secs(value)) {
                    Ok(()) => writeln!(out, "Interval set to {} seconds\n", value)?,
                    Err(err) => writeln!(out, "{}\n", err)?,
                }
            }
            MenuChoice::Arm => arm_system(&mut ctx, &mut out)?,
            MenuChoice::Quit => {
                writeln!(out, "Bye!")?;
                break;
            }
            MenuChoice::Invalid(_) => writeln!(out, "Invalid option.\n")?,
        }
    }
    Ok(())
}

fn take_background<W: Write>(ctx: &mut MenuContext<'_>, out: &mut W) -> Result<()> {
    let listening = ctx.cancel.listen();
    if !ctx
        .ui
        .countdown(ctx.countdown, "Background photo will be taken in:", ctx.cancel)
    {
        writeln!(out, "Background capture cancelled.\n")?;
        return Ok(());
    }
    drop(listening);

    let result = {
        let _stage = ctx.ui.stage("capturing background");
        ctx.monitor.capture_baseline(ctx.camera, ctx.decoder).map(|_| ())
    };
    match result {
        Ok(()) => writeln!(
            out,
            "Saved background image: {}\n",
            ctx.monitor.baseline().path().display()
        )?,
        Err(err) => writeln!(out, "{}\n", err)?,
    }
    Ok(())
}

fn arm_system<W: Write>(ctx: &mut MenuContext<'_>, out: &mut W) -> Result<()> {
    if !ctx.monitor.baseline().has_baseline() {
        writeln!(out, "No background image found. Choose option 1 first.\n")?;
        return Ok(());
    }

    let _listening = ctx.cancel.listen();
    if !ctx
        .ui
        .countdown(ctx.countdown, "Arming system. Exit camera view in:", ctx.cancel)
    {
        writeln!(out, "Arming cancelled.\n")?;
        return Ok(());
    }
    writeln!(out, "Monitoring started. Press CTRL+C to stop.\n")?;
    out.flush()?;

    match ctx.monitor.arm(ctx.camera, ctx.decoder, ctx.cancel) {
        Ok(report) => {
            match &report.exit {
                SessionExit::Cancelled => writeln!(out, "\nMonitoring stopped by user.")?,
                SessionExit::Failed(err) => writeln!(out, "\nMonitoring stopped: {}", err)?,
            }
            writeln!(
                out,
                "{} checks, {} intruder image(s) saved.\n",
                report.iterations,
                report.events.len()
            )?;
        }
        Err(err) => writeln!(out, "{}\n", err)?,
    }
    Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> Result<Option<String>> {
    write!(out, "{}", text)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn report_substitution<W: Write>(out: &mut W, note: Option<Substitution>) -> Result<()> {
    match note {
        Some(Substitution::Default(value)) => {
            writeln!(out, "Invalid input. Using default {}.", value)?
        }
        Some(Substitution::Minimum(value)) => writeln!(out, "Using minimum value {}.", value)?,
        Some(Substitution::Maximum(value)) => writeln!(out, "Using maximum value {}.", value)?,
        None => {}
    }
    Ok(())
}
