//! Consistency checks for raw and processed records.
//!
//! The types alone cannot express every rule a consumer relies on (an event
//! needs *some* title, a clamp summary flag must agree with its parts). These
//! checks report every broken rule instead of stopping at the first one.

use thiserror::Error;

use crate::model::{PersonKey, ProcessedEvent, RawCalendarEvent};

/// A single broken rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("neither 'title' nor 'name' is present")]
    MissingTitle,

    #[error("neither 'startDate' nor 'start' is present")]
    MissingStart,

    #[error("neither 'endDate' nor 'end' is present")]
    MissingEnd,

    #[error("start is after end")]
    InvertedRange,

    #[error("isClamped is {is_clamped} but clampedStart={clamped_start}, clampedEnd={clamped_end}")]
    ClampFlagMismatch {
        is_clamped: bool,
        clamped_start: bool,
        clamped_end: bool,
    },

    #[error("isMultiPerson is {is_multi_person} but persons is {}", presence(.has_persons))]
    PersonsMismatch {
        is_multi_person: bool,
        has_persons: bool,
    },

    #[error("personId {0} is not listed in persons")]
    PersonNotListed(u64),
}

fn presence(has_persons: &bool) -> &'static str {
    if *has_persons {
        "present"
    } else {
        "absent"
    }
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Check that a raw event carries at least one value for each aliased
/// concept. Blank strings count as absent.
pub fn check_raw_event(event: &RawCalendarEvent) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !present(&event.title) && !present(&event.name) {
        violations.push(Violation::MissingTitle);
    }
    if !present(&event.start_date) && !present(&event.start) {
        violations.push(Violation::MissingStart);
    }
    if !present(&event.end_date) && !present(&event.end) {
        violations.push(Violation::MissingEnd);
    }
    violations
}

/// Check the internal consistency of a processed record.
pub fn check_processed(event: &ProcessedEvent) -> Vec<Violation> {
    let mut violations = Vec::new();

    if event.start > event.end {
        violations.push(Violation::InvertedRange);
    }

    if event.is_clamped != (event.clamped_start || event.clamped_end) {
        violations.push(Violation::ClampFlagMismatch {
            is_clamped: event.is_clamped,
            clamped_start: event.clamped_start,
            clamped_end: event.clamped_end,
        });
    }

    if event.is_multi_person != event.persons.is_some() {
        violations.push(Violation::PersonsMismatch {
            is_multi_person: event.is_multi_person,
            has_persons: event.persons.is_some(),
        });
    }

    if let (Some(persons), PersonKey::Id(id)) = (&event.persons, &event.person_id) {
        if !persons.contains(id) {
            violations.push(Violation::PersonNotListed(*id));
        }
    }

    violations
}
