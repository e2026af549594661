// Rust guideline compliant 2026-10-15

//! Timestamp helpers for Stagegate.

use chrono::{DateTime, Utc};

/// Returns the current Unix timestamp in seconds.
#[must_use]
pub fn unix_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Formats a Unix timestamp as a minute-resolution UTC string.
///
/// Out-of-range values fall back to the raw number.
#[must_use]
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
