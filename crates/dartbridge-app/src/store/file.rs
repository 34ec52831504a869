//! Directory-backed shared store
//!
//! One `<key>.json` file per key. Several processes pointing at the same
//! directory share the store; changes written by another process are picked
//! up by a debounced file watcher.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use dartbridge_core::prelude::{Error, Result};

use super::{KeySubscription, SharedStore, StoreChange, CHANGE_CHANNEL_CAPACITY};

const EXTENSION: &str = "json";

/// State shared between the store handle and its watcher thread
struct Inner {
    dir: PathBuf,
    /// Last value seen per key, used to drop echoes of our own writes
    cache: Mutex<HashMap<String, Value>>,
    change_tx: broadcast::Sender<StoreChange>,
}

impl Inner {
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, EXTENSION))
    }

    fn read_key(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Record `new` for `key` and broadcast if it differs from the cached value
    fn observe(&self, key: &str, new: Value) -> Result<bool> {
        let old = {
            let mut cache = self
                .cache
                .lock()
                .map_err(|_| Error::store("file store cache lock poisoned"))?;
            if cache.get(key) == Some(&new) {
                return Ok(false);
            }
            cache.insert(key.to_string(), new.clone())
        };

        let _ = self.change_tx.send(StoreChange {
            key: key.to_string(),
            old,
            new: Some(new),
        });
        Ok(true)
    }

    /// Re-read a file touched by another process
    fn on_path_changed(&self, path: &Path) {
        let Some(key) = key_from_path(path) else {
            return;
        };

        match self.read_key(&key) {
            Ok(Some(value)) => match self.observe(&key, value) {
                Ok(true) => debug!("Store key {} changed on disk", key),
                Ok(false) => {}
                Err(e) => warn!("Failed to record change of {}: {}", key, e),
            },
            Ok(None) => {}
            Err(e) => debug!("Skipping unreadable store file {}: {}", path.display(), e),
        }
    }
}

/// Map `<dir>/<key>.json` back to `<key>`, ignoring temp files
fn key_from_path(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with('.') || stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

/// Shared store kept in a directory of JSON files
pub struct FileStore {
    inner: Arc<Inner>,
    /// Handle to stop the watcher
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FileStore {
    /// Open (and create if needed) a store directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::store(format!("Failed to create {}: {}", dir.display(), e)))?;

        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(Inner {
                dir,
                cache: Mutex::new(HashMap::new()),
                change_tx,
            }),
            stop_tx: None,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Start watching the directory for writes from other processes
    pub fn watch(&mut self, debounce: Duration) -> std::result::Result<(), String> {
        if self.is_watching() {
            return Err("Store watcher is already running".to_string());
        }

        let inner = self.inner.clone();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel();
        self.stop_tx = Some(stop_tx);

        std::thread::spawn(move || {
            Self::run_watcher(inner, debounce, stop_rx);
        });

        Ok(())
    }

    /// Stop watching for external changes
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_watching(&self) -> bool {
        self.stop_tx.is_some()
    }

    /// Internal: run the blocking watcher
    fn run_watcher(
        inner: Arc<Inner>,
        debounce: Duration,
        mut stop_rx: tokio::sync::oneshot::Receiver<()>,
    ) {
        let handler_inner = inner.clone();

        let debouncer_result = new_debouncer(
            debounce,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    for event in events.iter() {
                        for path in event.paths.iter() {
                            handler_inner.on_path_changed(path);
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        warn!("Store watcher error: {:?}", error);
                    }
                }
            },
        );

        let mut debouncer = match debouncer_result {
            Ok(d) => d,
            Err(e) => {
                error!("Failed to create store watcher: {}", e);
                return;
            }
        };

        if let Err(e) = debouncer.watch(&inner.dir, RecursiveMode::NonRecursive) {
            error!("Failed to watch {}: {}", inner.dir.display(), e);
            return;
        }
        info!("Watching store: {}", inner.dir.display());

        loop {
            match stop_rx.try_recv() {
                Ok(()) | Err(tokio::sync::oneshot::error::TryRecvError::Closed) => {
                    info!("Store watcher stopping");
                    break;
                }
                Err(tokio::sync::oneshot::error::TryRecvError::Empty) => {
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    }
}

impl SharedStore for FileStore {
    fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self.inner.path_for(key);
        let tmp = self.inner.dir.join(format!(".{}.{}.tmp", key, EXTENSION));

        std::fs::write(&tmp, serde_json::to_vec(&value)?)?;
        std::fs::rename(&tmp, &path)?;

        self.inner.observe(key, value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.inner.read_key(key)
    }

    fn subscribe(&self, key: &str) -> KeySubscription {
        KeySubscription::new(key, self.inner.change_tx.subscribe())
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::keys;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_directory() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("store");

        let store = FileStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[test]
    fn test_set_writes_key_file() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.set(keys::PRODUCER_HEARTBEAT, json!(42)).unwrap();

        let content = std::fs::read_to_string(temp.path().join("producer-heartbeat.json")).unwrap();
        assert_eq!(content, "42");
        assert_eq!(store.get(keys::PRODUCER_HEARTBEAT).unwrap(), Some(json!(42)));
    }

    #[test]
    fn test_two_handles_share_values() {
        let temp = tempdir().unwrap();
        let producer = FileStore::open(temp.path()).unwrap();
        let consumer = FileStore::open(temp.path()).unwrap();

        producer
            .set(keys::LATEST_ROUND, json!({"darts": ["T20", "T20", "T20"], "ts": 1}))
            .unwrap();

        let value = consumer.get(keys::LATEST_ROUND).unwrap().unwrap();
        assert_eq!(value["darts"][0], "T20");
    }

    #[test]
    fn test_local_set_notifies_once_per_change() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let mut sub = store.subscribe(keys::ENABLE_TRIGGER);

        store.set(keys::ENABLE_TRIGGER, json!(1)).unwrap();
        store.set(keys::ENABLE_TRIGGER, json!(1)).unwrap();
        store.set(keys::ENABLE_TRIGGER, json!(2)).unwrap();

        assert_eq!(sub.try_recv().unwrap().new, Some(json!(1)));
        assert_eq!(sub.try_recv().unwrap().new, Some(json!(2)));
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_external_write_is_observed() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        let mut sub = store.subscribe(keys::DISABLE_TRIGGER);

        let path = temp.path().join("disable-trigger.json");
        std::fs::write(&path, "7").unwrap();
        store.inner.on_path_changed(&path);
        // Same content seen again (e.g. a second fs event) is not re-broadcast
        store.inner.on_path_changed(&path);

        assert_eq!(sub.try_recv().unwrap().new, Some(json!(7)));
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_corrupt_file_reads_as_error() {
        let temp = tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        std::fs::write(temp.path().join("latest-round.json"), "{not json").unwrap();

        assert!(store.get(keys::LATEST_ROUND).is_err());
    }

    #[test]
    fn test_key_from_path() {
        assert_eq!(
            key_from_path(Path::new("/s/latest-round.json")),
            Some("latest-round".to_string())
        );
        assert_eq!(key_from_path(Path::new("/s/.latest-round.json.tmp")), None);
        assert_eq!(key_from_path(Path::new("/s/notes.txt")), None);
    }

    #[tokio::test]
    async fn test_watch_twice_is_error() {
        let temp = tempdir().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        assert!(store.watch(Duration::from_millis(50)).is_ok());
        let second = store.watch(Duration::from_millis(50));
        assert!(second.unwrap_err().contains("already running"));

        store.stop();
        assert!(!store.is_watching());
    }
}
