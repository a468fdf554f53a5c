//! Error types for event-lanes operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaneError {
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Event {id}: missing required field '{field}'")]
    MissingField { id: u64, field: &'static str },

    #[error("Event {id}: invalid '{field}' {reason}")]
    InvalidField {
        id: u64,
        field: &'static str,
        reason: String,
    },

    #[error("Event {id}: start {start} is after end {end}")]
    InvertedRange { id: u64, start: String, end: String },

    #[error("Invalid window: start {start} must be before end {end}")]
    InvalidWindow { start: String, end: String },

    #[error("Event {event_id}: unknown person {person_id}")]
    UnknownPerson { event_id: u64, person_id: u64 },

    #[error("Processed event {id} is inconsistent: {detail}")]
    Contract { id: u64, detail: String },
}

pub type Result<T> = std::result::Result<T, LaneError>;
