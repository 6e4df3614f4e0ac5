//! Time helpers. `now_utc()` exists so tests can be written without tying
//! every call site to `chrono::Utc::now()` directly.

use chrono::{DateTime, TimeZone, Utc};

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Parses an ISO-8601 timestamp. Naive (zone-less) timestamps are treated
/// as UTC, as required by the Normalizer's timestamp-parsing rule.
/// Unparseable input returns `None`; callers fall back to `now_utc()`.
pub fn parse_flexible(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    None
}
