//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast while messages are processed; subscribe with
//! `Engine::subscribe()`.

use dartbridge_core::Round;

use crate::channel::Timestamp;
use crate::entry::EntryReport;
use crate::message::TriggerKind;
use crate::state::BridgePhase;

/// Domain events emitted by the Engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Enablement
    // ─────────────────────────────────────────────────────────
    /// The bridge phase changed
    PhaseChanged {
        old_phase: BridgePhase,
        new_phase: BridgePhase,
    },

    /// A trigger event was written to the shared store
    TriggerPublished { kind: TriggerKind, at: Timestamp },

    // ─────────────────────────────────────────────────────────
    // Rounds
    // ─────────────────────────────────────────────────────────
    /// The producer published a completed round
    RoundBroadcast { round: Round },

    /// The consumer entered a round's score
    ScoreEntered { report: EntryReport },

    /// The consumer could not enter a round
    EntryFailed { reason: String },

    // ─────────────────────────────────────────────────────────
    // Engine Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PhaseChanged { .. } => "phase_changed",
            Self::TriggerPublished { .. } => "trigger_published",
            Self::RoundBroadcast { .. } => "round_broadcast",
            Self::ScoreEntered { .. } => "score_entered",
            Self::EntryFailed { .. } => "entry_failed",
            Self::Shutdown => "shutdown",
        }
    }
}
