//! Shared store visible to every bridge process
//!
//! A key/value store with per-key change notification. Producer and consumer
//! never talk directly; everything they exchange goes through here.
//!
//! ## Key ownership
//!
//! ```text
//! producer ──► latest-round, producer-heartbeat
//! consumer ──► own-competitor-index
//! either   ──► enable-trigger, disable-trigger   (timestamps: events, not state)
//! ```
//!
//! Each key has one logical writer, so the store needs no locking across
//! processes.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::warn;

use dartbridge_core::prelude::*;

/// Well-known store keys
pub mod keys {
    /// Last completed round (`{"darts": [...], "ts": ...}`)
    pub const LATEST_ROUND: &str = "latest-round";
    /// Cached scoreboard slot of the local operator
    pub const OWN_COMPETITOR_INDEX: &str = "own-competitor-index";
    /// Producer heartbeat (unix millis)
    pub const PRODUCER_HEARTBEAT: &str = "producer-heartbeat";
    /// Someone enabled the bridge (unix millis)
    pub const ENABLE_TRIGGER: &str = "enable-trigger";
    /// Someone disabled the bridge (unix millis)
    pub const DISABLE_TRIGGER: &str = "disable-trigger";
}

/// Capacity of the change broadcast channel
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A value changed under a key
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    pub key: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// Key/value store shared across bridge processes
pub trait SharedStore: Send + Sync {
    fn set(&self, key: &str, value: Value) -> Result<()>;

    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Subscribe to changes of one key
    ///
    /// Only changes made after this call are delivered.
    fn subscribe(&self, key: &str) -> KeySubscription;
}

/// Shared handle to a store
pub type SharedStoreRef = Arc<dyn SharedStore>;

/// Change notifications for a single key
pub struct KeySubscription {
    key: String,
    rx: broadcast::Receiver<StoreChange>,
}

impl KeySubscription {
    pub fn new(key: impl Into<String>, rx: broadcast::Receiver<StoreChange>) -> Self {
        Self {
            key: key.into(),
            rx,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Wait for the next change of this key
    ///
    /// Returns `None` once the store is gone. Lagging subscribers skip the
    /// changes they missed.
    pub async fn recv(&mut self) -> Option<StoreChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.key == self.key => return Some(change),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("Subscriber for {} lagged, missed {} change(s)", self.key, missed);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Option<StoreChange> {
        loop {
            match self.rx.try_recv() {
                Ok(change) if change.key == self.key => return Some(change),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
