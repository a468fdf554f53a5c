//! Calendar timeline data contracts.
//!
//! [`RawCalendarEvent`] is the wire shape accepted from upstream sources,
//! including the legacy alias fields. [`CalendarEvent`] is the canonical shape
//! every other module works with. [`ProcessedEvent`] is the render-ready
//! output of [`crate::process`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract;
use crate::error::LaneError;

/// A source event exactly as an upstream system sends it.
///
/// Each concept may arrive under either of two names (`title`/`name`,
/// `startDate`/`start`, `endDate`/`end`). All of them are optional here;
/// [`crate::normalize`] decides which value is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCalendarEvent {
    pub id: u64,
    /// Set when this event is a derived instance of another event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_event_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persons: Option<Vec<u64>>,
}

/// A source event with one field per concept and parsed timestamps.
///
/// Serializes with the authoritative wire names (`title`, `startDate`,
/// `endDate`), so the output is itself a valid [`RawCalendarEvent`].
/// Deserialization rejects events that start after they end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CalendarEventWire")]
pub struct CalendarEvent {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_event_id: Option<u64>,
    pub title: String,
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Attributed person ids in source order, without repeats.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persons: Vec<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarEventWire {
    id: u64,
    #[serde(default)]
    original_event_id: Option<u64>,
    title: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    persons: Vec<u64>,
}

impl TryFrom<CalendarEventWire> for CalendarEvent {
    type Error = LaneError;

    fn try_from(w: CalendarEventWire) -> Result<Self, Self::Error> {
        if w.start_date > w.end_date {
            return Err(LaneError::InvertedRange {
                id: w.id,
                start: w.start_date.to_rfc3339(),
                end: w.end_date.to_rfc3339(),
            });
        }
        Ok(CalendarEvent {
            id: w.id,
            original_event_id: w.original_event_id,
            title: w.title,
            start: w.start_date,
            end: w.end_date,
            description: w.description,
            place: w.place,
            category: w.category,
            color: w.color,
            persons: w.persons,
        })
    }
}

impl CalendarEvent {
    /// Id of the event this one ultimately derives from (itself when it is
    /// not a derived instance).
    pub fn root_id(&self) -> u64 {
        self.original_event_id.unwrap_or(self.id)
    }
}

/// An attendee or resource a timeline row is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
    /// Role or label, unrelated to an event title.
    pub title: String,
}

/// The row a processed record is rendered against.
///
/// On the wire this is either a JSON number (a person id) or a JSON string
/// (a synthetic group key such as the unassigned bucket).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonKey {
    Id(u64),
    Group(String),
}

impl PersonKey {
    /// The numeric person id, or `None` for a group key.
    pub fn person_id(&self) -> Option<u64> {
        match self {
            PersonKey::Id(id) => Some(*id),
            PersonKey::Group(_) => None,
        }
    }
}

impl fmt::Display for PersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonKey::Id(id) => write!(f, "{}", id),
            PersonKey::Group(key) => write!(f, "{}", key),
        }
    }
}

impl From<u64> for PersonKey {
    fn from(id: u64) -> Self {
        PersonKey::Id(id)
    }
}

/// A render-ready record: one source event placed on one person's row.
///
/// Deserialization rejects records whose flags contradict each other
/// (see [`contract::check_processed`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ProcessedEventWire")]
pub struct ProcessedEvent {
    pub id: u64,
    pub original_event_id: u64,
    pub person_id: PersonKey,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub name: String,
    pub color: String,
    pub is_multi_person: bool,
    /// Always `clamped_start || clamped_end`.
    pub is_clamped: bool,
    pub clamped_start: bool,
    pub clamped_end: bool,
    /// All person ids of the source event; present only for multi-person events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persons: Option<Vec<u64>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessedEventWire {
    id: u64,
    original_event_id: u64,
    person_id: PersonKey,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    name: String,
    color: String,
    is_multi_person: bool,
    is_clamped: bool,
    clamped_start: bool,
    clamped_end: bool,
    #[serde(default)]
    persons: Option<Vec<u64>>,
}

impl TryFrom<ProcessedEventWire> for ProcessedEvent {
    type Error = LaneError;

    fn try_from(w: ProcessedEventWire) -> Result<Self, Self::Error> {
        let event = ProcessedEvent {
            id: w.id,
            original_event_id: w.original_event_id,
            person_id: w.person_id,
            start: w.start,
            end: w.end,
            name: w.name,
            color: w.color,
            is_multi_person: w.is_multi_person,
            is_clamped: w.is_clamped,
            clamped_start: w.clamped_start,
            clamped_end: w.clamped_end,
            persons: w.persons,
        };

        let violations = contract::check_processed(&event);
        if violations.is_empty() {
            Ok(event)
        } else {
            let detail = violations
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(LaneError::Contract {
                id: event.id,
                detail,
            })
        }
    }
}
