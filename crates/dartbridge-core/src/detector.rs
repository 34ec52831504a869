//! Round completion detector for the producer side.
//!
//! The source only shows darts transiently: slots fill in one by one while a
//! turn is thrown, then the whole display blanks before the next turn. The
//! detector is fed one reading per poll tick and reports a completed round
//! exactly once, on the first all-blank reading after a non-blank one.
//!
//! A turn of three misses never shows a non-blank value, so it leaves the
//! detector in [`DetectorState::Idle`] and is reported as
//! [`TickOutcome::BlankWithoutSnapshot`] instead of a round.

use chrono::{DateTime, Utc};

use crate::dart::{normalize_reading, DartValue, Round, DARTS_PER_ROUND};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Result of feeding one reading to the detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Reading had at least one dart; it replaced the snapshot
    Collecting,

    /// Display blanked after a snapshot: the snapshot is a finished round
    RoundComplete(Round),

    /// Display is blank and nothing is pending (between turns, or an all-miss turn)
    BlankWithoutSnapshot,
}

/// Detector states
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetectorState {
    /// No darts seen since the last published round
    #[default]
    Idle,

    /// Darts of the current turn seen; the latest reading is kept
    Collecting {
        snapshot: [DartValue; DARTS_PER_ROUND],
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Detector
// ─────────────────────────────────────────────────────────────────────────────

/// Tick-by-tick state machine turning display readings into rounds
#[derive(Debug, Default)]
pub struct RoundDetector {
    state: DetectorState,
}

impl RoundDetector {
    /// Create a new detector in Idle state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Feed one raw reading (up to three notations, in throw order)
    pub fn feed<S: AsRef<str>>(&mut self, reading: &[S], now: DateTime<Utc>) -> TickOutcome {
        let current = normalize_reading(reading);

        if current.iter().any(|d| !d.is_blank()) {
            self.state = DetectorState::Collecting { snapshot: current };
            return TickOutcome::Collecting;
        }

        match std::mem::take(&mut self.state) {
            DetectorState::Collecting { snapshot } => {
                TickOutcome::RoundComplete(Round::new(snapshot, now))
            }
            DetectorState::Idle => TickOutcome::BlankWithoutSnapshot,
        }
    }

    /// Drop any pending snapshot
    pub fn reset(&mut self) {
        self.state = DetectorState::Idle;
    }
}
