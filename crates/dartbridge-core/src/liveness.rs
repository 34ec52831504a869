//! Producer liveness classification
//!
//! The producer writes a heartbeat timestamp every few seconds. The consumer
//! only ever looks at the latest one: the producer counts as live while that
//! timestamp is younger than the liveness window.

use std::fmt;
use std::time::Duration;

/// Default heartbeat interval on the producer side
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Default age beyond which a heartbeat is considered stale
pub const DEFAULT_LIVENESS_WINDOW: Duration = Duration::from_secs(10);

/// Result of checking the latest heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// No heartbeat has ever been written
    Absent,
    /// Heartbeat exists but is too old
    Stale { age_ms: i64 },
    /// Heartbeat is younger than the window
    Live { age_ms: i64 },
}

impl Liveness {
    /// Classify a heartbeat (unix millis) against `now_ms`
    pub fn classify(heartbeat_ms: Option<i64>, now_ms: i64, window: Duration) -> Self {
        let Some(heartbeat_ms) = heartbeat_ms else {
            return Self::Absent;
        };

        let age_ms = now_ms.saturating_sub(heartbeat_ms);
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);

        if age_ms < window_ms {
            Self::Live { age_ms }
        } else {
            Self::Stale { age_ms }
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "no heartbeat found"),
            Self::Stale { age_ms } => write!(f, "heartbeat too old: {} ms ago", age_ms),
            Self::Live { age_ms } => write!(f, "heartbeat detected: {} ms ago", age_ms),
        }
    }
}
