//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert non-negative seconds to whole milliseconds, rounding to nearest
pub fn secs_to_millis(secs: f64) -> u64 {
    (secs * 1000.0).round() as u64
}

/// Round to three decimal places (millisecond precision for persisted times)
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
