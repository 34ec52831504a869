//! Bridge state (Model in TEA pattern)

use std::fmt;

use dartbridge_core::Role;

use crate::channel::Timestamp;
use crate::entry::EntryReport;
use crate::message::TriggerKind;

/// Enablement lifecycle of one execution context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgePhase {
    #[default]
    Disabled,
    /// Enable requested, waiting on the heartbeat check (consumer only)
    Enabling,
    Enabled,
}

impl BridgePhase {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl fmt::Display for BridgePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Enabling => write!(f, "enabling"),
            Self::Enabled => write!(f, "enabled"),
        }
    }
}

/// Complete state of one bridge context
#[derive(Debug, Clone)]
pub struct BridgeState {
    pub role: Role,
    pub phase: BridgePhase,

    /// Timestamps of the latest triggers this context wrote, per kind;
    /// our own writes echo back through the store and must be ignored
    last_enable_written: Option<Timestamp>,
    last_disable_written: Option<Timestamp>,

    /// Producer: rounds published since startup
    pub rounds_published: u32,
    /// Consumer: rounds entered since startup
    pub rounds_entered: u32,
    /// Consumer: rounds that could not be entered
    pub rounds_failed: u32,
    pub last_entry: Option<EntryReport>,

    quitting: bool,
}

impl BridgeState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            phase: BridgePhase::Disabled,
            last_enable_written: None,
            last_disable_written: None,
            rounds_published: 0,
            rounds_entered: 0,
            rounds_failed: 0,
            last_entry: None,
            quitting: false,
        }
    }

    /// Only the consumer shows the toggle and notifications
    pub fn is_interactive(&self) -> bool {
        self.role.is_consumer()
    }

    pub fn record_trigger(&mut self, kind: TriggerKind, at: Timestamp) {
        match kind {
            TriggerKind::Enable => self.last_enable_written = Some(at),
            TriggerKind::Disable => self.last_disable_written = Some(at),
        }
    }

    /// True when a trigger event is (or predates) one we wrote ourselves
    pub fn is_own_trigger(&self, kind: TriggerKind, at: Timestamp) -> bool {
        let written = match kind {
            TriggerKind::Enable => self.last_enable_written,
            TriggerKind::Disable => self.last_disable_written,
        };
        written.is_some_and(|written| at <= written)
    }

    pub fn request_quit(&mut self) {
        self.quitting = true;
    }

    pub fn should_quit(&self) -> bool {
        self.quitting
    }
}
