//! Frame comparison.
//!
//! The score is the sum of absolute per-pixel differences over the region the two
//! frames share. Frames of different sizes are compared over their common top-left
//! rectangle; nothing outside it contributes.

use std::fmt;

use crate::frame::Frame;

/// Dissimilarity between two frames. Larger means more change in the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiffScore(pub u64);

impl DiffScore {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DiffScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of scoring a probe against the reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub score: DiffScore,
    pub detected: bool,
}

/// Score `probe` against `reference` over their overlapping region.
pub fn score(reference: &Frame, probe: &Frame) -> DiffScore {
    let width = reference.width().min(probe.width()) as usize;
    let height = reference.height().min(probe.height());

    let mut total: i64 = 0;
    for y in 0..height {
        let a = &reference.row(y)[..width];
        let b = &probe.row(y)[..width];
        total += a
            .iter()
            .zip(b)
            .map(|(&a, &b)| (a as i64 - b as i64).abs())
            .sum::<i64>();
    }
    // Sum of absolute values is never negative.
    DiffScore(total as u64)
}

/// A score counts as a detection only when it is strictly above the threshold.
pub fn detected(score: DiffScore, threshold: u64) -> bool {
    score.0 > threshold
}

/// Score and classify in one step.
pub fn evaluate(reference: &Frame, probe: &Frame, threshold: u64) -> Verdict {
    let score = score(reference, probe);
    Verdict {
        score,
        detected: detected(score, threshold),
    }
}
