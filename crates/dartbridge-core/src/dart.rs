//! Dart notation and rounds
//!
//! A [`DartValue`] is the notation string shown for one thrown dart
//! (`"S20"`, `"D16"`, `"T19"`, `"25"`, `"BULL"`, `"-"`). A [`Round`] is the
//! three darts of one turn plus the time it was published.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of darts thrown per round
pub const DARTS_PER_ROUND: usize = 3;

/// Notation the source shows for an empty dart slot
pub const BLANK_NOTATION: &str = "-";

/// Points for the inner bull
pub const BULL_POINTS: u32 = 50;

/// Points for the outer bull
pub const OUTER_BULL_POINTS: u32 = 25;

static SEGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([SDT])(\d+)$").expect("Invalid segment pattern regex"));

static NUMERIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("Invalid numeric pattern regex"));

/// One thrown dart in source notation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DartValue(String);

impl DartValue {
    /// Create a dart value, trimming surrounding whitespace
    pub fn new(notation: impl Into<String>) -> Self {
        let notation = notation.into();
        Self(notation.trim().to_string())
    }

    /// The "no dart" placeholder
    pub fn blank() -> Self {
        Self(BLANK_NOTATION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for an empty slot or the `-` placeholder
    pub fn is_blank(&self) -> bool {
        self.0.is_empty() || self.0 == BLANK_NOTATION
    }

    /// True when the dart landed in a double segment
    pub fn is_double(&self) -> bool {
        self.0.starts_with('D')
    }

    /// True for the inner bull (case-insensitive)
    pub fn is_bull(&self) -> bool {
        self.0.eq_ignore_ascii_case("bull")
    }

    /// Point value of this dart
    ///
    /// Unrecognized notation scores 0 rather than failing.
    pub fn points(&self) -> u32 {
        let s = self.as_str();

        if self.is_blank() {
            return 0;
        }
        if s == "25" {
            return OUTER_BULL_POINTS;
        }
        if self.is_bull() {
            return BULL_POINTS;
        }

        if let Some(caps) = SEGMENT_PATTERN.captures(s) {
            let multiplier = match &caps[1] {
                "S" => 1,
                "D" => 2,
                "T" => 3,
                _ => return 0,
            };
            return caps[2]
                .parse::<u32>()
                .map(|n| n.saturating_mul(multiplier))
                .unwrap_or(0);
        }

        if NUMERIC_PATTERN.is_match(s) {
            return s.parse().unwrap_or(0);
        }

        0
    }
}

impl fmt::Display for DartValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DartValue {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DartValue {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Pad or truncate a raw reading to exactly three darts
///
/// Slots the source did not render are blank.
pub fn normalize_reading<S: AsRef<str>>(raw: &[S]) -> [DartValue; DARTS_PER_ROUND] {
    let mut darts: [DartValue; DARTS_PER_ROUND] = Default::default();
    for (i, slot) in darts.iter_mut().enumerate() {
        *slot = raw
            .get(i)
            .map(|s| DartValue::new(s.as_ref()))
            .unwrap_or_default();
    }
    darts
}

/// Three darts of one turn, as published by the producer
///
/// Serialized as `{"darts": [...], "ts": <unix millis>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub darts: [DartValue; DARTS_PER_ROUND],
    /// Publication time in unix milliseconds
    pub ts: i64,
}

impl Round {
    pub fn new(darts: [DartValue; DARTS_PER_ROUND], published_at: DateTime<Utc>) -> Self {
        Self {
            darts,
            ts: published_at.timestamp_millis(),
        }
    }

    /// Sum of the three darts' points
    pub fn total(&self) -> u32 {
        round_total(&self.darts)
    }

    /// The third dart, which decides whether a checkout is valid
    pub fn last_dart(&self) -> &DartValue {
        &self.darts[DARTS_PER_ROUND - 1]
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.ts).single()
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.darts[0], self.darts[1], self.darts[2])
    }
}

/// Sum of points across a sequence of darts, saturating at `u32::MAX`
pub fn round_total(darts: &[DartValue]) -> u32 {
    darts
        .iter()
        .map(DartValue::points)
        .fold(0u32, u32::saturating_add)
}
