//! Score decision for the consumer side
//!
//! Given a round and the tracked player's remaining score, decide what to
//! enter into the scoreboard: the raw total, or 0 for a bust, a leave of 1,
//! or a checkout that did not finish on a double (or the bull).

use std::fmt;

use crate::dart::{round_total, DartValue, BULL_POINTS, DARTS_PER_ROUND};

/// Number of competitor slots on the scoreboard
pub const COMPETITOR_SLOTS: usize = 2;

/// Which remaining-score slot belongs to the local operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompetitorIndex {
    Resolved(usize),
    #[default]
    Unresolved,
}

impl CompetitorIndex {
    /// Build from an optional slot, rejecting anything outside the two slots
    pub fn from_slot(slot: Option<usize>) -> Self {
        match slot {
            Some(i) if i < COMPETITOR_SLOTS => Self::Resolved(i),
            _ => Self::Unresolved,
        }
    }

    pub fn slot(&self) -> Option<usize> {
        match self {
            Self::Resolved(i) => Some(*i),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl fmt::Display for CompetitorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(i) => write!(f, "slot {}", i),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Outcome of classifying a round against the remaining score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreDecision {
    /// Competitor unknown: raw total, no bust or finish rules applied
    BestEffort(u32),
    /// Ordinary scoring round
    Normal(u32),
    /// Total exceeds the remaining score
    Bust,
    /// Would leave exactly 1, which cannot be finished
    LeavesOne,
    /// Finished on a double or the bull
    Checkout(u32),
    /// Reached zero without a valid finishing dart
    InvalidCheckout,
}

impl ScoreDecision {
    /// Value to enter into the scoreboard
    pub fn score(&self) -> u32 {
        match self {
            Self::BestEffort(total) | Self::Normal(total) | Self::Checkout(total) => *total,
            Self::Bust | Self::LeavesOne | Self::InvalidCheckout => 0,
        }
    }

    /// True when the round's points are thrown away
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Bust | Self::LeavesOne | Self::InvalidCheckout)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BestEffort(_) => "best-effort",
            Self::Normal(_) => "normal",
            Self::Bust => "bust",
            Self::LeavesOne => "leaves-one",
            Self::Checkout(_) => "checkout",
            Self::InvalidCheckout => "invalid-checkout",
        }
    }
}

impl fmt::Display for ScoreDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.score(), self.label())
    }
}

/// Whether the last dart makes `total` a legal finish
fn is_valid_finish(total: u32, last_dart: Option<&DartValue>) -> bool {
    match last_dart {
        Some(dart) => dart.is_double() || (total == BULL_POINTS && dart.is_bull()),
        None => false,
    }
}

/// Decide the score to enter for a round
///
/// `remaining` is the live remaining-score vector read from the sink,
/// `darts` the round in throw order (the third dart decides checkouts).
pub fn decide(
    total: u32,
    index: CompetitorIndex,
    remaining: &[u32],
    darts: &[DartValue],
) -> ScoreDecision {
    let Some(remaining) = index.slot().and_then(|i| remaining.get(i)).copied() else {
        return ScoreDecision::BestEffort(total);
    };

    if total > remaining {
        return ScoreDecision::Bust;
    }

    if remaining - total == 1 {
        return ScoreDecision::LeavesOne;
    }

    if total == remaining {
        let last_dart = darts.get(DARTS_PER_ROUND - 1);
        return if is_valid_finish(total, last_dart) {
            ScoreDecision::Checkout(total)
        } else {
            ScoreDecision::InvalidCheckout
        };
    }

    ScoreDecision::Normal(total)
}

/// Convenience: total and decide in one step
pub fn decide_round(
    darts: &[DartValue],
    index: CompetitorIndex,
    remaining: &[u32],
) -> ScoreDecision {
    decide(round_total(darts), index, remaining, darts)
}
