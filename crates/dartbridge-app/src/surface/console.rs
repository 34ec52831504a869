//! Terminal notifications and toggle indicator

use std::io::Write;

use tracing::{info, warn};

use crate::config::NotifySettings;

use super::{toggle_menu_label, Notification, Notifier, Severity, ToggleSurface};

/// Prints notifications to stderr
pub struct ConsoleNotifier {
    settings: NotifySettings,
}

impl ConsoleNotifier {
    pub fn new(settings: NotifySettings) -> Self {
        Self { settings }
    }

    /// The line printed for `notification`, or `None` when notifications are off
    ///
    /// The line carries how long the notice is meant to stay up; urgent
    /// notices use the longer error timeout.
    pub fn render(&self, notification: &Notification) -> Option<String> {
        if !self.settings.enabled {
            return None;
        }

        let secs = notification.timeout(&self.settings).as_secs_f32();
        let line = match notification.severity {
            Severity::Normal => format!(
                "[{}] {} ({}s)",
                notification.title, notification.text, secs
            ),
            Severity::Urgent => format!(
                "[{}] !! {} ({}s)",
                notification.title, notification.text, secs
            ),
        };
        Some(line)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let Some(line) = self.render(&notification) else {
            return;
        };

        match notification.severity {
            Severity::Normal => info!("Notification: {}", line),
            Severity::Urgent => warn!("Notification: {}", line),
        }
        eprintln!("{}", line);
    }
}

/// Writes the on/off indicator and its menu label to stdout
pub struct ConsoleToggle<W: Write + Send = std::io::Stdout> {
    out: W,
}

impl ConsoleToggle {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> ConsoleToggle<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ToggleSurface for ConsoleToggle<W> {
    fn render(&mut self, enabled: bool) {
        let state = if enabled { "ON" } else { "OFF" };
        let _ = writeln!(
            self.out,
            "Bridge: {}    [{}]",
            state,
            toggle_menu_label(enabled)
        );
        let _ = self.out.flush();
    }
}
