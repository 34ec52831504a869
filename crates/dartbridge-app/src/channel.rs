//! Typed publish/subscribe over the shared store
//!
//! A [`Channel`] binds one store key to one payload type. Publishing writes the
//! payload; subscribers are told that something was published, and must not
//! read the stored value as the current truth of anything beyond "this was
//! published at some point".

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use dartbridge_core::prelude::*;
use dartbridge_core::Round;

use crate::store::{keys, KeySubscription, SharedStoreRef};

/// Unix milliseconds, the payload of heartbeat and trigger keys
pub type Timestamp = i64;

/// A typed view of one store key
pub struct Channel<T> {
    store: SharedStoreRef,
    key: &'static str,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key,
            _payload: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Channel<T> {
    pub fn new(store: SharedStoreRef, key: &'static str) -> Self {
        Self {
            store,
            key,
            _payload: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn publish(&self, payload: &T) -> Result<()> {
        let value = serde_json::to_value(payload)?;
        self.store.set(self.key, value)
    }

    /// The most recently published payload, if any
    pub fn latest(&self) -> Result<Option<T>> {
        match self.store.get(self.key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            inner: self.store.subscribe(self.key),
            _payload: PhantomData,
        }
    }
}

/// Typed change notifications for a [`Channel`]
pub struct Subscription<T> {
    inner: KeySubscription,
    _payload: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Subscription<T> {
    /// Wait for the next well-formed payload
    ///
    /// Deleted values and payloads that fail to decode are skipped.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            let change = self.inner.recv().await?;
            if let Some(payload) = self.decode(change.new) {
                return Some(payload);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            let change = self.inner.try_recv()?;
            if let Some(payload) = self.decode(change.new) {
                return Some(payload);
            }
        }
    }

    fn decode(&self, value: Option<serde_json::Value>) -> Option<T> {
        let value = value?;
        match serde_json::from_value(value) {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!("Ignoring malformed payload on {}: {}", self.inner.key(), e);
                None
            }
        }
    }
}

/// All channels the bridge uses, bound to one store
#[derive(Clone)]
pub struct BridgeChannels {
    pub rounds: Channel<Round>,
    pub competitor: Channel<usize>,
    pub heartbeat: Channel<Timestamp>,
    pub enable: Channel<Timestamp>,
    pub disable: Channel<Timestamp>,
}

impl BridgeChannels {
    pub fn new(store: SharedStoreRef) -> Self {
        Self {
            rounds: Channel::new(store.clone(), keys::LATEST_ROUND),
            competitor: Channel::new(store.clone(), keys::OWN_COMPETITOR_INDEX),
            heartbeat: Channel::new(store.clone(), keys::PRODUCER_HEARTBEAT),
            enable: Channel::new(store.clone(), keys::ENABLE_TRIGGER),
            disable: Channel::new(store, keys::DISABLE_TRIGGER),
        }
    }
}
