use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::DateRangeError;

/// Number of days ahead covered by an upcoming-bookings query.
pub const UPCOMING_WINDOW_DAYS: u64 = 90;

/// A date range with inclusive start and end dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Creates a date range for an entire month.
    pub fn month(year: i32, month: u32) -> Result<Self, DateRangeError> {
        let invalid = DateRangeError::InvalidMonth { year, month };
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid.clone())?;

        // Last day of the month: first of next month minus a day
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(invalid)?;

        Ok(Self { start, end })
    }

    /// Creates the window used by upcoming-bookings queries starting at `from`.
    pub fn upcoming(from: NaiveDate) -> Self {
        let end = from
            .checked_add_days(Days::new(UPCOMING_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MAX);
        Self { start: from, end }
    }

    /// Returns true if `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns true if the two ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest range covering both ranges.
    pub fn span(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Number of days in the range, both ends included.
    pub fn num_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// Iterates over every day in the range.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Returns `(year, month)` if the range is exactly one calendar month.
    pub fn as_month(&self) -> Option<(i32, u32)> {
        let month = DateRange::month(self.start.year(), self.start.month()).ok()?;
        (month == *self).then(|| (self.start.year(), self.start.month()))
    }
}

/// Operations a backend supports.
///
/// Reading and writing are universal; subscribing to change notifications is
/// optional and must be checked before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub read: bool,
    pub write: bool,
    pub bulk_write: bool,
    pub subscribe: bool,
}

impl Capabilities {
    /// Capabilities of a backend without change notifications.
    pub const fn without_subscribe() -> Self {
        Self {
            read: true,
            write: true,
            bulk_write: true,
            subscribe: false,
        }
    }

    /// Capabilities of a backend that pushes row-level changes.
    pub const fn with_subscribe() -> Self {
        Self {
            read: true,
            write: true,
            bulk_write: true,
            subscribe: true,
        }
    }
}
