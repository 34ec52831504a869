//! Handler module - TEA update function and the actions it requests
//!
//! - `update`: the bridge state machine, message dispatch

pub(crate) mod update;

#[cfg(test)]
mod tests;

use dartbridge_core::Round;

use crate::channel::Timestamp;
use crate::entry::EntryReport;
use crate::message::{DisableReason, Message, TriggerKind};

pub use update::update;

/// Actions that the engine should perform after update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Write a trigger event to the shared store
    PublishTrigger { kind: TriggerKind, at: Timestamp },

    /// Read the producer heartbeat and report back
    CheckLiveness,

    /// Start the role's timers and listeners (poller or round listener)
    Activate,

    /// Stop all timers and listeners started by `Activate`
    Deactivate(DisableReason),

    /// Score a round into the sink
    EnterRound(Round),

    /// Re-read the sink once the entry has settled
    ConfirmEntry(EntryReport),

    /// Re-render the toggle
    RenderToggle,
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the engine to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    pub fn with_message(mut self, msg: Message) -> Self {
        self.message = Some(msg);
        self
    }
}
