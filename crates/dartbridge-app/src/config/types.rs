//! Configuration types for the dart bridge
//!
//! Defines:
//! - `Settings` - Global bridge settings
//! - Per-section sub-types (`[bridge]`, `[store]`, `[source]`, `[sink]`, `[notify]`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use dartbridge_core::{DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_LIVENESS_WINDOW};

/// Lower bound for the source poll interval
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

/// Lower bound for the heartbeat interval
pub const MIN_HEARTBEAT_INTERVAL_MS: u64 = 500;

/// Application settings (.dartbridge/config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub bridge: BridgeSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub sink: SinkSettings,

    #[serde(default)]
    pub notify: NotifySettings,
}

/// Bridge timing settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeSettings {
    /// How often the producer reads the source display
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How often the producer writes its heartbeat
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Maximum heartbeat age for the producer to count as live
    #[serde(default = "default_liveness_window_ms")]
    pub liveness_window_ms: u64,

    /// Delay before re-reading the scoreboard after entering a score
    #[serde(default = "default_confirm_delay_ms")]
    pub confirm_delay_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            liveness_window_ms: default_liveness_window_ms(),
            confirm_delay_ms: default_confirm_delay_ms(),
        }
    }
}

impl BridgeSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(MIN_HEARTBEAT_INTERVAL_MS))
    }

    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.liveness_window_ms)
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_heartbeat_interval_ms() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL.as_millis() as u64
}

fn default_liveness_window_ms() -> u64 {
    DEFAULT_LIVENESS_WINDOW.as_millis() as u64
}

fn default_confirm_delay_ms() -> u64 {
    400
}

/// Shared store settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSettings {
    /// Directory holding one JSON file per key (relative to the working dir)
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,

    /// Debounce for change notifications from other processes
    #[serde(default = "default_store_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            debounce_ms: default_store_debounce_ms(),
        }
    }
}

impl StoreSettings {
    pub fn resolve_dir(&self, workdir: &Path) -> PathBuf {
        workdir.join(&self.dir)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".dartbridge/store")
}

fn default_store_debounce_ms() -> u64 {
    100
}

/// Source (dart recognition display) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSettings {
    /// File mirroring the currently displayed darts
    #[serde(default = "default_source_file")]
    pub file: PathBuf,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            file: default_source_file(),
        }
    }
}

impl SourceSettings {
    pub fn resolve_file(&self, workdir: &Path) -> PathBuf {
        workdir.join(&self.file)
    }
}

fn default_source_file() -> PathBuf {
    PathBuf::from("source.txt")
}

/// Sink (scoreboard) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SinkSettings {
    /// Directory holding the scoreboard files
    #[serde(default = "default_sink_dir")]
    pub dir: PathBuf,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            dir: default_sink_dir(),
        }
    }
}

impl SinkSettings {
    pub fn resolve_dir(&self, workdir: &Path) -> PathBuf {
        workdir.join(&self.dir)
    }
}

fn default_sink_dir() -> PathBuf {
    PathBuf::from("sink")
}

/// User-visible notification settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// How long normal notifications stay visible
    #[serde(default = "default_notify_timeout_ms")]
    pub timeout_ms: u64,

    /// How long urgent notifications stay visible
    #[serde(default = "default_error_timeout_ms")]
    pub error_timeout_ms: u64,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: default_notify_timeout_ms(),
            error_timeout_ms: default_error_timeout_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_notify_timeout_ms() -> u64 {
    3_000
}

fn default_error_timeout_ms() -> u64 {
    8_000
}
