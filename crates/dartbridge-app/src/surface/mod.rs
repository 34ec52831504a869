//! Collaborators the bridge observes and drives
//!
//! Neither side of the bridge has an API. The source is only read, the sink
//! is read and written through its visible state, and the operator sees
//! notifications and a toggle indicator.

mod console;
mod file;

pub use console::{ConsoleNotifier, ConsoleToggle};
pub use file::{FileSink, FileSource, ACTIVE_FILE, REMAINING_FILE, SCORE_INPUT_FILE};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dartbridge_core::prelude::*;

use crate::config::NotifySettings;

/// The dart recognition display
#[cfg_attr(test, mockall::automock)]
pub trait SourceSurface: Send {
    /// Current dart notations in throw order, at most three
    ///
    /// Slots showing nothing come back blank or are omitted.
    fn read_darts(&mut self) -> Result<Vec<String>>;
}

/// The scoreboard
#[cfg_attr(test, mockall::automock)]
pub trait SinkSurface: Send {
    /// Remaining score per competitor slot
    fn remaining_scores(&self) -> Result<Vec<u32>>;

    /// Slot currently showing the "active turn" cue, if any
    fn active_turn_slot(&self) -> Option<usize>;

    /// Clear the score field, type `score`, and commit it
    ///
    /// Fails with [`Error::SurfaceNotFound`] when the field is missing.
    fn enter_score(&mut self, score: u32) -> Result<()>;
}

/// Source shared between the engine and the poll task
pub type SharedSource = Arc<Mutex<dyn SourceSurface>>;

/// Sink shared between the engine and the confirmation task
pub type SharedSink = Arc<Mutex<dyn SinkSurface>>;

/// How prominently a notification is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Normal,
    Urgent,
}

/// A fire-and-forget message for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub text: String,
    pub severity: Severity,
}

impl Notification {
    pub fn normal(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            severity: Severity::Normal,
        }
    }

    pub fn urgent(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            severity: Severity::Urgent,
        }
    }

    /// How long the notification should stay visible
    pub fn timeout(&self, settings: &NotifySettings) -> Duration {
        match self.severity {
            Severity::Normal => Duration::from_millis(settings.timeout_ms),
            Severity::Urgent => Duration::from_millis(settings.error_timeout_ms),
        }
    }
}

/// Delivers notifications; delivery is not guaranteed
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// The on/off indicator and its activation control
#[cfg_attr(test, mockall::automock)]
pub trait ToggleSurface: Send {
    /// Show the current enablement; safe to call repeatedly
    fn render(&mut self, enabled: bool);
}

/// Label of the toggle's menu entry for the current state
pub fn toggle_menu_label(enabled: bool) -> &'static str {
    if enabled {
        "Bridge: Disable"
    } else {
        "Bridge: Enable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgent_notifications_stay_longer() {
        let settings = NotifySettings::default();
        let normal = Notification::normal("Bridge", "ready");
        let urgent = Notification::urgent("Bridge", "input missing");

        assert_eq!(normal.timeout(&settings), Duration::from_secs(3));
        assert_eq!(urgent.timeout(&settings), Duration::from_secs(8));
    }

    #[test]
    fn test_toggle_menu_label() {
        assert_eq!(toggle_menu_label(true), "Bridge: Disable");
        assert_eq!(toggle_menu_label(false), "Bridge: Enable");
    }
}
