//! In-process shared store

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tokio::sync::broadcast;

use dartbridge_core::prelude::*;

use super::{KeySubscription, SharedStore, StoreChange, CHANGE_CHANNEL_CAPACITY};

/// Store living in one process's memory
///
/// Every `set` notifies subscribers, even when the value is unchanged.
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    change_tx: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: Mutex::new(HashMap::new()),
            change_tx,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStore for MemoryStore {
    fn set(&self, key: &str, value: Value) -> Result<()> {
        let old = {
            let mut values = self
                .values
                .lock()
                .map_err(|_| Error::store("memory store lock poisoned"))?;
            values.insert(key.to_string(), value.clone())
        };

        // No subscribers is fine
        let _ = self.change_tx.send(StoreChange {
            key: key.to_string(),
            old,
            new: Some(value),
        });
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::store("memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn subscribe(&self, key: &str) -> KeySubscription {
        KeySubscription::new(key, self.change_tx.subscribe())
    }
}
