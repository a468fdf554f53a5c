//! # event-lanes
//!
//! Typed contracts for calendar timeline data and the processing step that
//! turns raw calendar events into render-ready, per-person records.
//!
//! Raw events arrive with legacy alias fields (`title`/`name`,
//! `startDate`/`start`, `endDate`/`end`). They are collapsed into a single
//! canonical [`CalendarEvent`] at the boundary, then split per attributed
//! person and clamped to an optional visible [`Window`].
//!
//! ## Quick start
//!
//! ```rust
//! use event_lanes::{process_raw, ProcessOptions, RawCalendarEvent};
//!
//! let raws: Vec<RawCalendarEvent> = serde_json::from_str(r#"[
//!     {"id": 7, "name": "Standup", "start": "2026-03-16T09:00:00Z",
//!      "end": "2026-03-16T09:15:00Z", "persons": [1, 2]}
//! ]"#).unwrap();
//!
//! let outcome = process_raw(&raws, &[], &ProcessOptions::default()).unwrap();
//! assert_eq!(outcome.report.events.len(), 2);
//! assert!(outcome.report.events[0].is_multi_person);
//! ```
//!
//! ## Modules
//!
//! - [`model`] — `RawCalendarEvent`, `CalendarEvent`, `Person`, `ProcessedEvent`
//! - [`timestamp`] — string timestamp parsing with IANA timezone support
//! - [`normalize`] — legacy alias fields → canonical `CalendarEvent`
//! - [`window`] — visible range and boundary clamping
//! - [`process`] — per-person split, clamping, ordering, id assignment
//! - [`overlap`] — overlapping records of the same person
//! - [`contract`] — consistency checks for raw and processed records
//! - [`error`] — Error types

pub mod contract;
pub mod error;
pub mod model;
pub mod normalize;
pub mod overlap;
pub mod process;
pub mod timestamp;
pub mod window;

pub use contract::{check_processed, check_raw_event, Violation};
pub use error::LaneError;
pub use model::{CalendarEvent, Person, PersonKey, ProcessedEvent, RawCalendarEvent};
pub use normalize::{normalize_all, normalize_event, NormalizeOptions, NormalizeReport, Rejected};
pub use overlap::{find_overlaps, Overlap};
pub use process::{
    process, process_raw, ProcessOptions, ProcessOutcome, ProcessReport, UnknownPersonPolicy,
};
pub use window::{ClampFlags, Window};
