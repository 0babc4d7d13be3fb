//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as the RFC 3339 text stored in `created_at`/`updated_at` columns
///
/// Millisecond precision with a `Z` suffix keeps lexical and chronological order equal.
pub fn timestamp() -> String {
    format_timestamp(&now())
}

/// Format a timestamp the way the store persists it
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's date as `YYYY-MM-DD` (default song release date)
pub fn today() -> String {
    now().format("%Y-%m-%d").to_string()
}
