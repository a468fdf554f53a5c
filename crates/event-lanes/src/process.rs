//! Turn canonical events into render-ready, per-person records.
//!
//! Each visible event yields one [`ProcessedEvent`] per attributed person
//! (or a single record on the unassigned row), with its boundaries clamped
//! to the optional visible window. Output is sorted chronologically and
//! numbered `1..=n`, so the same input always produces the same records.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{LaneError, Result};
use crate::model::{CalendarEvent, Person, PersonKey, ProcessedEvent, RawCalendarEvent};
use crate::normalize::{normalize_all, NormalizeOptions, Rejected};
use crate::window::{ClampFlags, Window};

/// Color used when a source event has none.
pub const DEFAULT_COLOR: &str = "#3788d8";

/// Group key for events attributed to nobody.
pub const DEFAULT_UNASSIGNED_KEY: &str = "unassigned";

/// What to do with person ids missing from a non-empty person directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPersonPolicy {
    /// Render the id as its own row anyway.
    #[default]
    Keep,
    /// Leave the id out of the event.
    Drop,
    /// Fail the whole run with `LaneError::UnknownPerson`.
    Reject,
}

/// Knobs for [`process`] and [`process_raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Visible range. `None` renders every event unclamped.
    pub window: Option<Window>,
    pub default_color: String,
    pub unassigned_key: String,
    pub unknown_persons: UnknownPersonPolicy,
    /// Used by [`process_raw`] only.
    pub normalize: NormalizeOptions,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            window: None,
            default_color: DEFAULT_COLOR.to_string(),
            unassigned_key: DEFAULT_UNASSIGNED_KEY.to_string(),
            unknown_persons: UnknownPersonPolicy::default(),
            normalize: NormalizeOptions::default(),
        }
    }
}

/// Output of [`process`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Sorted by `(start, end, original_event_id)`, ids `1..=n`.
    pub events: Vec<ProcessedEvent>,
    /// Number of source events entirely outside the window.
    pub hidden: usize,
}

/// Output of [`process_raw`].
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    pub report: ProcessReport,
    /// Raw events that failed normalization, in input order.
    pub rejected: Vec<Rejected>,
}

/// Process canonical events against a person directory.
///
/// An empty `persons` directory disables unknown-person handling: every
/// attributed id gets a row.
///
/// # Errors
/// - `LaneError::InvertedRange` if an event starts after it ends
/// - `LaneError::UnknownPerson` under [`UnknownPersonPolicy::Reject`]
pub fn process(
    events: &[CalendarEvent],
    persons: &[Person],
    opts: &ProcessOptions,
) -> Result<ProcessReport> {
    let directory: HashSet<u64> = persons.iter().map(|p| p.id).collect();
    let mut records = Vec::new();
    let mut hidden = 0;

    for event in events {
        if event.start > event.end {
            return Err(LaneError::InvertedRange {
                id: event.id,
                start: event.start.to_rfc3339(),
                end: event.end.to_rfc3339(),
            });
        }

        let (start, end, flags) = match &opts.window {
            None => (event.start, event.end, ClampFlags::default()),
            Some(window) => match window.clamp(event.start, event.end) {
                Some(c) => (c.start, c.end, c.flags),
                None => {
                    debug!(event_id = event.id, "event outside window, hiding");
                    hidden += 1;
                    continue;
                }
            },
        };

        let attributed = resolve_persons(event, &directory, opts.unknown_persons)?;
        let is_multi_person = attributed.len() > 1;
        let shared = is_multi_person.then(|| attributed.clone());

        let keys: Vec<PersonKey> = if attributed.is_empty() {
            vec![PersonKey::Group(opts.unassigned_key.clone())]
        } else {
            attributed.into_iter().map(PersonKey::from).collect()
        };

        for person_id in keys {
            records.push(ProcessedEvent {
                id: 0,
                original_event_id: event.root_id(),
                person_id,
                start,
                end,
                name: event.title.clone(),
                color: event
                    .color
                    .clone()
                    .unwrap_or_else(|| opts.default_color.clone()),
                is_multi_person,
                is_clamped: flags.is_clamped(),
                clamped_start: flags.start,
                clamped_end: flags.end,
                persons: shared.clone(),
            });
        }
    }

    // Stable: records from one event keep their person order.
    records.sort_by_key(|r| (r.start, r.end, r.original_event_id));
    for (index, record) in records.iter_mut().enumerate() {
        record.id = index as u64 + 1;
    }

    debug!(records = records.len(), hidden, "processed calendar events");

    Ok(ProcessReport {
        events: records,
        hidden,
    })
}

/// Normalize raw events, then [`process`] the ones that are valid.
///
/// Normalization failures do not abort the run; they are returned in
/// [`ProcessOutcome::rejected`].
pub fn process_raw(
    raws: &[RawCalendarEvent],
    persons: &[Person],
    opts: &ProcessOptions,
) -> Result<ProcessOutcome> {
    let normalized = normalize_all(raws, &opts.normalize);
    let report = process(&normalized.events, persons, opts)?;
    Ok(ProcessOutcome {
        report,
        rejected: normalized.rejected,
    })
}

/// The distinct person ids an event is rendered against, after applying the
/// unknown-person policy. An empty directory knows every id.
fn resolve_persons(
    event: &CalendarEvent,
    directory: &HashSet<u64>,
    policy: UnknownPersonPolicy,
) -> Result<Vec<u64>> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(event.persons.len());
    for &person_id in &event.persons {
        if !seen.insert(person_id) {
            continue;
        }
        if directory.is_empty() || directory.contains(&person_id) {
            resolved.push(person_id);
            continue;
        }
        match policy {
            UnknownPersonPolicy::Keep => resolved.push(person_id),
            UnknownPersonPolicy::Drop => {
                debug!(event_id = event.id, person_id, "dropping unknown person");
            }
            UnknownPersonPolicy::Reject => {
                return Err(LaneError::UnknownPerson {
                    event_id: event.id,
                    person_id,
                });
            }
        }
    }
    Ok(resolved)
}
