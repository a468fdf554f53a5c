//! Collapse legacy alias fields into the canonical [`CalendarEvent`].
//!
//! Upstream data carries each concept under two names. The authoritative
//! name (`title`, `startDate`, `endDate`) wins when both are set; the alias
//! (`name`, `start`, `end`) is the fallback. Blank strings count as absent.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{LaneError, Result};
use crate::model::{CalendarEvent, RawCalendarEvent};
use crate::timestamp::parse_timestamp;

/// Options for interpreting raw events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Zone for timestamps that carry no offset.
    pub timezone: Tz,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { timezone: Tz::UTC }
    }
}

/// An input event that could not be normalized.
#[derive(Debug)]
pub struct Rejected {
    pub id: u64,
    pub error: LaneError,
}

/// Result of normalizing a batch: accepted and rejected events, each in
/// input order.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    pub events: Vec<CalendarEvent>,
    pub rejected: Vec<Rejected>,
}

/// Normalize one raw event.
///
/// # Errors
/// - `LaneError::MissingField` when a concept has no non-blank value under
///   either name
/// - `LaneError::InvalidField` when a chosen timestamp does not parse
/// - `LaneError::InvertedRange` when start is after end
pub fn normalize_event(raw: &RawCalendarEvent, opts: &NormalizeOptions) -> Result<CalendarEvent> {
    let id = raw.id;

    let title = pick(id, ("title", &raw.title), ("name", &raw.name))
        .ok_or(LaneError::MissingField { id, field: "title" })?;
    let start_str = pick(id, ("startDate", &raw.start_date), ("start", &raw.start))
        .ok_or(LaneError::MissingField {
            id,
            field: "startDate",
        })?;
    let end_str = pick(id, ("endDate", &raw.end_date), ("end", &raw.end))
        .ok_or(LaneError::MissingField {
            id,
            field: "endDate",
        })?;

    let start = parse_field(id, "startDate", start_str, opts.timezone)?;
    let end = parse_field(id, "endDate", end_str, opts.timezone)?;
    if start > end {
        return Err(LaneError::InvertedRange {
            id,
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
    }

    Ok(CalendarEvent {
        id,
        original_event_id: raw.original_event_id,
        title: title.to_string(),
        start,
        end,
        description: raw.description.clone(),
        place: raw.place.clone(),
        category: raw.category.clone(),
        color: raw.color.clone(),
        persons: dedup_persons(raw.persons.as_deref().unwrap_or_default()),
    })
}

/// Normalize a batch, collecting failures instead of stopping at the first.
pub fn normalize_all(raws: &[RawCalendarEvent], opts: &NormalizeOptions) -> NormalizeReport {
    let mut report = NormalizeReport::default();
    for raw in raws {
        match normalize_event(raw, opts) {
            Ok(event) => report.events.push(event),
            Err(error) => {
                debug!(event_id = raw.id, %error, "rejecting calendar event");
                report.rejected.push(Rejected { id: raw.id, error });
            }
        }
    }
    report
}

/// Choose between an authoritative field and its legacy alias.
fn pick<'a>(
    id: u64,
    (primary_name, primary): (&'static str, &'a Option<String>),
    (alias_name, alias): (&'static str, &'a Option<String>),
) -> Option<&'a str> {
    let primary = non_blank(primary);
    let alias = non_blank(alias);
    match (primary, alias) {
        (Some(p), Some(a)) => {
            if p != a {
                debug!(
                    event_id = id,
                    kept = primary_name,
                    discarded = alias_name,
                    "alias fields disagree"
                );
            }
            Some(p)
        }
        (Some(p), None) => Some(p),
        (None, a) => a,
    }
}

/// Parse a timestamp, attributing failures to the event and field.
fn parse_field(id: u64, field: &'static str, value: &str, tz: Tz) -> Result<DateTime<Utc>> {
    parse_timestamp(value, tz).map_err(|e| match e {
        LaneError::InvalidTimestamp { value, reason } => LaneError::InvalidField {
            id,
            field,
            reason: format!("'{}': {}", value, reason),
        },
        other => other,
    })
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// Keep first occurrence of each id, preserving order.
fn dedup_persons(persons: &[u64]) -> Vec<u64> {
    let mut seen = HashSet::new();
    persons.iter().copied().filter(|id| seen.insert(*id)).collect()
}
