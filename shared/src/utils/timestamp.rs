//! Ledger timestamp helpers
//!
//! Timestamps are persisted as UTC text in `YYYY-MM-DD HH:MM:SS` form so that
//! lexical order matches chronological order. Precision is whole seconds, the
//! same precision as the `iat` claim of a signed token.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};

/// Storage format for every timestamp column
pub const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Drop sub-second precision
pub fn truncate_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_nanosecond(0).unwrap_or(at)
}

/// Render a timestamp for storage
pub fn format_db_timestamp(at: DateTime<Utc>) -> String {
    at.format(DB_TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp
pub fn parse_db_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, DB_TIMESTAMP_FORMAT).map(|naive| Utc.from_utc_datetime(&naive))
}

/// Convert a JWT `iat`/`exp` claim to a timestamp
pub fn from_epoch_seconds(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}
