//! Detection loop and armed/alerting state machine.
//!
//! ```text
//!   Idle --arm (baseline present)--> Armed --score > threshold--> Alerting
//!    ^                                 |  ^                           |
//!    |                                 |  +------alert + archive------+
//!    +----cancel / capture failure-----+
//! ```
//!
//! While armed, each iteration checks the cancel token, captures a probe, scores it
//! against the baseline, alerts and archives on detection, then sleeps for the interval.
//! Leaving `Armed` always goes through `ArmedSession::drop`, which clears the display
//! and resets the state to `Idle`.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::alert::{AlertDispatcher, AlertSettings};
use crate::archive::IntruderArchive;
use crate::baseline::BaselineStore;
use crate::cancel::CancelToken;
use crate::capture::Camera;
use crate::compare::{self, DiffScore};
use crate::decode::FrameDecoder;
use crate::error::MonitorError;
use crate::frame::{Frame, FrameSize};

/// Starting sensitivity; tune experimentally for the room.
pub const DEFAULT_THRESHOLD: u64 = 5_000_000;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

pub const MIN_THRESHOLD: u64 = 1;
pub const MIN_INTERVAL_SECS: u64 = 1;
/// One day between captures is the longest interval accepted.
pub const MAX_INTERVAL_SECS: u64 = 86_400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemState {
    Idle,
    Armed,
    Alerting,
}

impl SystemState {
    pub fn as_str(self) -> &'static str {
        match self {
            SystemState::Idle => "idle",
            SystemState::Armed => "armed",
            SystemState::Alerting => "alerting",
        }
    }
}

/// Tunables for an armed session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorSettings {
    /// Scores strictly above this count as a detection.
    pub threshold: u64,
    /// Sleep between captures.
    pub interval: Duration,
    pub alert: AlertSettings,
    pub frame_size: FrameSize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            interval: DEFAULT_INTERVAL,
            alert: AlertSettings::default(),
            frame_size: FrameSize::default(),
        }
    }
}

/// Record of one detection. Written once.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionEvent {
    /// When the probe was scored. The archived file name is stamped later, once
    /// the alert has finished.
    pub timestamp: DateTime<Local>,
    pub score: DiffScore,
    pub archived: PathBuf,
}

/// Why an armed session ended.
#[derive(Debug)]
pub enum SessionExit {
    Cancelled,
    Failed(MonitorError),
}

/// Summary of an armed session, returned once the monitor is idle again.
#[derive(Debug)]
pub struct SessionReport {
    pub iterations: u64,
    pub events: Vec<DetectionEvent>,
    pub exit: SessionExit,
}

pub struct Monitor {
    state: SystemState,
    settings: MonitorSettings,
    baseline: BaselineStore,
    archive: IntruderArchive,
    dispatcher: AlertDispatcher,
    probe_path: PathBuf,
}

impl Monitor {
    pub fn new(
        settings: MonitorSettings,
        baseline: BaselineStore,
        archive: IntruderArchive,
        dispatcher: AlertDispatcher,
        probe_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            state: SystemState::Idle,
            settings,
            baseline,
            archive,
            dispatcher,
            probe_path: probe_path.into(),
        }
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn baseline(&self) -> &BaselineStore {
        &self.baseline
    }

    pub fn archive(&self) -> &IntruderArchive {
        &self.archive
    }

    pub fn probe_path(&self) -> &Path {
        &self.probe_path
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    pub fn set_threshold(&mut self, threshold: u64) -> Result<(), MonitorError> {
        self.ensure_idle()?;
        self.settings.threshold = threshold;
        Ok(())
    }

    pub fn set_interval(&mut self, interval: Duration) -> Result<(), MonitorError> {
        self.ensure_idle()?;
        self.settings.interval = interval;
        Ok(())
    }

    pub fn capture_baseline(
        &mut self,
        camera: &mut dyn Camera,
        decoder: &dyn FrameDecoder,
    ) -> Result<&Frame, MonitorError> {
        self.ensure_idle()?;
        self.baseline
            .capture_baseline(camera, decoder, self.settings.frame_size)
            .map_err(MonitorError::capture)
    }

    /// Run an armed session until `cancel` fires or an iteration fails.
    ///
    /// Returns `MissingBaseline` without touching the state when no baseline exists.
    /// Every other outcome is reported through `SessionReport::exit`, after cleanup.
    pub fn arm(
        &mut self,
        camera: &mut dyn Camera,
        decoder: &dyn FrameDecoder,
        cancel: &CancelToken,
    ) -> Result<SessionReport, MonitorError> {
        self.ensure_idle()?;
        if !self.baseline.has_baseline() {
            log::warn!("arm rejected: no baseline captured");
            return Err(MonitorError::MissingBaseline);
        }

        let Self {
            state,
            settings,
            baseline,
            archive,
            dispatcher,
            probe_path,
        } = self;
        let reference = baseline.get_baseline()?;
        let settings = *settings;

        let mut session = ArmedSession::enter(state, dispatcher);
        if let Err(err) = archive.prepare() {
            log::warn!("{:#}", err);
        }

        let mut iterations = 0u64;
        let mut events = Vec::new();
        let exit = loop {
            if cancel.is_cancelled() {
                break SessionExit::Cancelled;
            }
            iterations += 1;

            match run_iteration(
                &mut session,
                reference,
                &settings,
                archive,
                probe_path,
                camera,
                decoder,
            ) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(err) => {
                    log::error!("monitoring aborted: {}", err);
                    break SessionExit::Failed(err);
                }
            }

            if cancel.sleep(settings.interval) {
                break SessionExit::Cancelled;
            }
        };
        drop(session);

        if matches!(exit, SessionExit::Cancelled) {
            log::info!("monitoring stopped by operator");
        }
        Ok(SessionReport {
            iterations,
            events,
            exit,
        })
    }

    fn ensure_idle(&self) -> Result<(), MonitorError> {
        match self.state {
            SystemState::Idle => Ok(()),
            other => Err(MonitorError::ConfigurationLocked(other.as_str())),
        }
    }
}

fn run_iteration(
    session: &mut ArmedSession<'_>,
    reference: &Frame,
    settings: &MonitorSettings,
    archive: &IntruderArchive,
    probe_path: &Path,
    camera: &mut dyn Camera,
    decoder: &dyn FrameDecoder,
) -> Result<Option<DetectionEvent>, MonitorError> {
    let written = camera
        .capture(probe_path, settings.frame_size)
        .map_err(MonitorError::capture)?;
    let probe = decoder
        .load_grayscale(&written)
        .map_err(MonitorError::capture)?;

    let verdict = compare::evaluate(reference, &probe, settings.threshold);
    let now = Local::now();
    log::info!(
        "[{}] diff score = {} (threshold={})",
        now.format("%Y-%m-%d %H:%M:%S"),
        verdict.score,
        settings.threshold
    );
    if !verdict.detected {
        return Ok(None);
    }

    session.set(SystemState::Alerting);
    log::warn!("INTRUDER DETECTED (score {})", verdict.score);
    session
        .dispatcher
        .raise_alert(settings.alert.duration, settings.alert.blink_hz);
    // Named for when the file lands in the archive, after the alert finished.
    let archived = archive
        .archive(&written, Local::now())
        .map_err(MonitorError::archive)?;
    log::warn!("saved intruder image: {}", archived.display());
    session.set(SystemState::Armed);

    Ok(Some(DetectionEvent {
        timestamp: now,
        score: verdict.score,
        archived,
    }))
}

/// Scope of the `Armed` posture. Dropping it clears the display and returns to `Idle`.
struct ArmedSession<'a> {
    state: &'a mut SystemState,
    dispatcher: &'a mut AlertDispatcher,
}

impl<'a> ArmedSession<'a> {
    fn enter(state: &'a mut SystemState, dispatcher: &'a mut AlertDispatcher) -> Self {
        *state = SystemState::Armed;
        log::info!("monitoring started");
        Self { state, dispatcher }
    }

    fn set(&mut self, state: SystemState) {
        *self.state = state;
    }
}

impl Drop for ArmedSession<'_> {
    fn drop(&mut self) {
        self.dispatcher.clear();
        *self.state = SystemState::Idle;
        log::debug!("armed session closed; display cleared");
    }
}
