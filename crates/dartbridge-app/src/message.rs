//! Message types for the bridge state machine

use std::fmt;

use dartbridge_core::{Liveness, Round};

use crate::channel::Timestamp;
use crate::entry::EntryReport;

/// Which trigger key an event was written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Enable,
    Disable,
}

impl TriggerKind {
    pub fn for_target(enabled: bool) -> Self {
        if enabled {
            Self::Enable
        } else {
            Self::Disable
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enable => write!(f, "enable"),
            Self::Disable => write!(f, "disable"),
        }
    }
}

/// All messages that can update bridge state
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // Local Control
    // ─────────────────────────────────────────────────────────
    /// Flip enablement from the toggle
    Toggle,

    /// Request a specific enablement locally
    SetEnabled(bool),

    /// Re-render the toggle without changing state
    RefreshToggle,

    /// Shut down
    Quit,

    // ─────────────────────────────────────────────────────────
    // Cross-Context Events
    // ─────────────────────────────────────────────────────────
    /// A trigger was written to the shared store (possibly by us)
    RemoteTrigger { kind: TriggerKind, at: Timestamp },

    // ─────────────────────────────────────────────────────────
    // Lifecycle Steps
    // ─────────────────────────────────────────────────────────
    /// Finish a Disabled -> Enabling transition
    BeginEnable,

    /// Result of the consumer's heartbeat check
    LivenessChecked(Liveness),

    /// Enablement just dropped; stop timers and listeners
    BridgeDisabled(DisableReason),

    // ─────────────────────────────────────────────────────────
    // Rounds
    // ─────────────────────────────────────────────────────────
    /// The producer published a round
    RoundBroadcast(Round),

    /// The consumer observed a published round
    RoundPublished(Round),

    /// A round's score was entered into the sink
    RoundEntered(EntryReport),

    /// A round could not be entered
    RoundEntryFailed { reason: String },

    /// Remaining scores read back after an entry settled
    EntryConfirmed {
        before: Vec<u32>,
        after: Vec<u32>,
    },
}

/// Why enablement dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableReason {
    /// Local disable request
    Requested,
    /// Disable trigger from another context
    Remote,
    /// Consumer enable failed its heartbeat check
    RolledBack(Liveness),
}

impl fmt::Display for DisableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "requested"),
            Self::Remote => write!(f, "remote trigger"),
            Self::RolledBack(liveness) => write!(f, "rolled back ({})", liveness),
        }
    }
}
