//! Time and timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// UTC timestamp used for action dates, movement times and cache stamps.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Render a timestamp as an ISO-8601 instant with millisecond precision,
/// e.g. `2025-01-02T00:00:00.000Z`.
#[must_use]
pub fn to_iso(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 string into a UTC timestamp.
#[must_use]
pub fn parse_iso(value: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.to_utc())
}
