//! String timestamp parsing.
//!
//! Calendar sources encode timestamps as strings in a handful of shapes.
//! Offset-carrying RFC 3339 values are taken as-is; naive date-times and bare
//! dates are interpreted as wall-clock time in a caller-supplied IANA zone.

use crate::error::{LaneError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Naive date-time layouts accepted after RFC 3339 fails. `%.f` also
/// matches an absent fractional part.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an IANA timezone identifier (e.g., "Europe/Helsinki").
///
/// # Errors
/// Returns `LaneError::InvalidTimezone` for anything `chrono-tz` does not know.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| LaneError::InvalidTimezone(name.to_string()))
}

/// Parse a string-encoded timestamp into a UTC instant.
///
/// Accepted shapes, tried in order:
/// - RFC 3339 with offset: `2026-03-16T09:00:00Z`, `2026-03-16T11:00:00+02:00`
/// - naive date-time: `2026-03-16T09:00:00`, `2026-03-16T09:00`,
///   `2026-03-16 09:00:00.250` — wall-clock time in `tz`
/// - date only: `2026-03-16` — local midnight in `tz`
///
/// Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant.
///
/// # Errors
/// Returns `LaneError::InvalidTimestamp` for empty or unrecognized input and
/// for wall-clock times that do not exist in `tz` (DST gap).
pub fn parse_timestamp(input: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return Err(invalid(input, "empty timestamp"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| invalid(input, "unrecognized timestamp format"))?;

    localize(naive, tz)
        .ok_or_else(|| invalid(input, &format!("local time does not exist in {}", tz)))
}

/// Resolve a wall-clock time in `tz`, preferring the earlier instant when the
/// local time is ambiguous.
fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn invalid(value: &str, reason: &str) -> LaneError {
    LaneError::InvalidTimestamp {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
