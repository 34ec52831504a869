//! # dartbridge-core - Core Domain Types
//!
//! Foundation crate for the dart bridge. Provides dart notation, rounds,
//! the round detector, the score decision, liveness classification, the
//! process role and error handling.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Darts (`dart`)
//! - [`DartValue`] - One dart in source notation, with its point value
//! - [`Round`] - Three darts plus publication time
//!
//! ### Round Detection (`detector`)
//! - [`RoundDetector`] - Tick-by-tick state machine over display readings
//! - [`TickOutcome`] - Result of feeding one reading
//!
//! ### Scoring (`scoring`)
//! - [`CompetitorIndex`] - Which scoreboard slot is ours, if known
//! - [`ScoreDecision`] - Bust / leaves-one / checkout / normal classification
//! - [`decide()`] - The decision function
//!
//! ### Liveness (`liveness`)
//! - [`Liveness`] - Absent / stale / live heartbeat classification
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use dartbridge_core::prelude::*;
//! ```

pub mod dart;
pub mod detector;
pub mod error;
pub mod liveness;
pub mod logging;
pub mod role;
pub mod scoring;

/// Prelude for common imports used throughout all dart bridge crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use dart::{
    normalize_reading, round_total, DartValue, Round, BLANK_NOTATION, BULL_POINTS,
    DARTS_PER_ROUND, OUTER_BULL_POINTS,
};
pub use detector::{DetectorState, RoundDetector, TickOutcome};
pub use error::{Error, Result, ResultExt};
pub use liveness::{Liveness, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_LIVENESS_WINDOW};
pub use role::Role;
pub use scoring::{decide, decide_round, CompetitorIndex, ScoreDecision, COMPETITOR_SLOTS};
