//! Dart Bridge
//!
//! Carries dart rounds from a recognition display (the producer side) into a
//! scoreboard (the consumer side). Each side runs as its own process; they
//! meet in a shared store directory.

pub mod runner;
pub mod stdin;

pub use runner::{run_bridge, RunOptions};
