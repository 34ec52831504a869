//! dartbridge-app - Bridge state machine and orchestration
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the bridge
//! enablement lifecycle, the Engine that executes its actions, configuration
//! loading, the shared store, and the surfaces the bridge reads and drives.

pub mod beacon;
pub mod channel;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod entry;
pub mod handler;
pub mod listener;
pub mod message;
pub mod poller;
pub mod signals;
pub mod state;
pub mod store;
pub mod surface;

// Re-export primary types
pub use channel::{BridgeChannels, Channel, Timestamp};
pub use engine::{Engine, EngineBuilder};
pub use engine_event::EngineEvent;
pub use entry::{EntryReport, ScoreEntry};
pub use handler::{UpdateAction, UpdateResult};
pub use message::{DisableReason, Message, TriggerKind};
pub use state::{BridgePhase, BridgeState};
pub use store::{FileStore, MemoryStore, SharedStore, SharedStoreRef};
