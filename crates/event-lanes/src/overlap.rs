//! Detect processed records that share time on the same person's row.
//!
//! Adjacent records (where one ends exactly when another starts) do NOT
//! overlap. Records on different rows never overlap.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{PersonKey, ProcessedEvent};

/// Two records on one row whose time ranges intersect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlap {
    pub person_id: PersonKey,
    /// Processed id of the lower-numbered record.
    pub first: u64,
    /// Processed id of the higher-numbered record.
    pub second: u64,
    /// Shared time in whole minutes, rounded up so that any positive overlap
    /// is at least 1. Zero only when a zero-length record sits inside another.
    pub overlap_minutes: i64,
}

/// Find every overlapping pair of records that share a `person_id`.
///
/// Two records overlap when `a.start < b.end && b.start < a.end`; the overlap
/// duration is `min(a.end, b.end) - max(a.start, b.start)`, rounded up to
/// whole minutes. Pairs are ordered
/// by `(first, second)`.
pub fn find_overlaps(records: &[ProcessedEvent]) -> Vec<Overlap> {
    let mut ordered: Vec<&ProcessedEvent> = records.iter().collect();
    ordered.sort_by_key(|r| r.id);

    let mut overlaps = Vec::new();
    for (i, a) in ordered.iter().enumerate() {
        for b in &ordered[i + 1..] {
            if a.person_id != b.person_id {
                continue;
            }
            if a.start < b.end && b.start < a.end {
                let overlap = a.end.min(b.end) - a.start.max(b.start);
                debug!(person = %a.person_id, first = a.id, second = b.id, "records overlap");
                overlaps.push(Overlap {
                    person_id: a.person_id.clone(),
                    first: a.id,
                    second: b.id,
                    overlap_minutes: ceil_minutes(overlap),
                });
            }
        }
    }

    overlaps
}

fn ceil_minutes(duration: Duration) -> i64 {
    let millis = duration.num_milliseconds();
    (millis + 59_999).div_euclid(60_000)
}
