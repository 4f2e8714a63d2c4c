//! Clock access for reading timestamps.

use chrono::{DateTime, SecondsFormat, Utc};

/// When a sensor reading was taken, always UTC.
pub type Timestamp = DateTime<Utc>;

/// Wall-clock time stamped onto each parsed or simulated reading.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Fixed-width RFC 3339 text with microseconds and a `Z` suffix.
///
/// Telemetry rows keep `observed_at` as text; a constant width makes
/// lexical order in the `observed_at` index match chronological order.
#[must_use]
pub fn to_sortable_text(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
