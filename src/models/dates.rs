//! Date-interval arithmetic for stays, restrictions and the calendar.
//!
//! All intervals are closed-open: a stay `[2024-05-01, 2024-05-03)` occupies
//! the nights of the 1st and the 2nd, and a stay starting on the 3rd does
//! not collide with it.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date format used by the booking forms (`2024-05-01`).
pub const DATE_FMT: &str = "%Y-%m-%d";

/// Error for empty or inverted date ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid date range: {start} .. {end}")]
pub struct InvalidRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Closed-open date interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl StayRange {
    /// Build a range, rejecting `start >= end`. A zero-length range is
    /// invalid input, not "always free".
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRange> {
        if start >= end {
            return Err(InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// One-night range `[day, day + 1)`, as used by manual calendar blocks.
    pub fn one_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day + Days::new(1),
        }
    }

    /// Parse `start`/`end` form fields in `YYYY-MM-DD` format.
    pub fn parse(start: &str, end: &str) -> Result<Self, InvalidRange> {
        let bad = || InvalidRange {
            start: NaiveDate::MIN,
            end: NaiveDate::MIN,
        };
        let start = NaiveDate::parse_from_str(start, DATE_FMT).map_err(|_| bad())?;
        let end = NaiveDate::parse_from_str(end, DATE_FMT).map_err(|_| bad())?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Strict half-open intersection: `a.start < b.end && a.end > b.start`.
    /// This is the single overlap test availability decisions are made with.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// End-inclusive intersection used by the range listing query:
    /// `start < self.end && end >= self.start`, where `self` is the stored
    /// interval and `[start, end]` the queried window. The asymmetry is
    /// deliberate — the calendar passes the last day of the month as `end`
    /// and still wants restrictions starting exactly on that day.
    pub fn intersects_inclusive(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start < self.end && end >= self.start
    }

    /// Days covered by the interval, excluding `end` (half-open).
    pub fn nights(&self) -> impl Iterator<Item = NaiveDate> {
        let (start, end) = (self.start, self.end);
        std::iter::successors(Some(start), move |d| {
            let next = *d + Days::new(1);
            (next < end).then_some(next)
        })
    }

    /// Days covered including both endpoints, the way the calendar marks a
    /// restriction onto the grid.
    pub fn days_inclusive(&self) -> impl Iterator<Item = NaiveDate> {
        let (start, end) = (self.start, self.end);
        std::iter::successors(Some(start), move |d| {
            let next = *d + Days::new(1);
            (next <= end).then_some(next)
        })
    }
}

impl std::fmt::Display for StayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// First and last day of the given month, or `None` for an out-of-range
/// year/month pair.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))? - Days::new(1);
    Some((first, last))
}

/// Calendar form day key: `YYYY-MM-D`, month zero-padded, day not.
///
/// The admin calendar's checkbox names were built this way by the template
/// and the stored block maps must use the identical string.
pub fn day_key(day: NaiveDate) -> String {
    format!("{}-{:02}-{}", day.year(), day.month(), day.day())
}
