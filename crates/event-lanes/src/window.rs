//! Visible time range and boundary clamping.

use chrono::{DateTime, Utc};
use crate::error::{LaneError, Result};

/// A half-open visible range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Which boundaries of an interval were cut to fit a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClampFlags {
    pub start: bool,
    pub end: bool,
}

impl ClampFlags {
    pub fn is_clamped(&self) -> bool {
        self.start || self.end
    }
}

/// An interval after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub flags: ClampFlags,
}

impl Window {
    /// # Errors
    /// Returns `LaneError::InvalidWindow` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(LaneError::InvalidWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `[start, end]` shares any time with the window.
    ///
    /// Touching a boundary is not sharing time, except that a zero-length
    /// interval sitting on the window start is visible.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if start == end {
            return self.start <= start && start < self.end;
        }
        start < self.end && end > self.start
    }

    /// Cut an interval to the window. `None` when it is not visible at all.
    pub fn clamp(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Clamped> {
        if !self.intersects(start, end) {
            return None;
        }
        let flags = ClampFlags {
            start: start < self.start,
            end: end > self.end,
        };
        Some(Clamped {
            start: start.max(self.start),
            end: end.min(self.end),
            flags,
        })
    }
}
