use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::DateRange;

/// The entity a cached query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Bookings,
    Expenses,
    RecurringExpenses,
    MonthlyStats,
    RangeStats,
    DeskStatistics,
    UpcomingDates,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Bookings => "bookings",
            QueryKind::Expenses => "expenses",
            QueryKind::RecurringExpenses => "recurring-expenses",
            QueryKind::MonthlyStats => "monthly-stats",
            QueryKind::RangeStats => "range-stats",
            QueryKind::DeskStatistics => "desk-statistics",
            QueryKind::UpcomingDates => "upcoming-dates",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a cached read: the entity kind plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    Bookings(DateRange),
    Expenses(DateRange),
    RecurringExpenses,
    MonthlyStats { year: i32, month: u32 },
    RangeStats(DateRange),
    DeskStatistics(DateRange),
    UpcomingDates { from: NaiveDate, limit: usize },
}

impl QueryKey {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryKey::Bookings(_) => QueryKind::Bookings,
            QueryKey::Expenses(_) => QueryKind::Expenses,
            QueryKey::RecurringExpenses => QueryKind::RecurringExpenses,
            QueryKey::MonthlyStats { .. } => QueryKind::MonthlyStats,
            QueryKey::RangeStats(_) => QueryKind::RangeStats,
            QueryKey::DeskStatistics(_) => QueryKind::DeskStatistics,
            QueryKey::UpcomingDates { .. } => QueryKind::UpcomingDates,
        }
    }

    /// The days the cached result depends on.
    ///
    /// `None` means the result does not depend on dates, or that its period
    /// could not be derived; such keys match every period.
    pub fn period(&self) -> Option<DateRange> {
        match self {
            QueryKey::Bookings(range)
            | QueryKey::Expenses(range)
            | QueryKey::RangeStats(range)
            | QueryKey::DeskStatistics(range) => Some(*range),
            QueryKey::MonthlyStats { year, month } => DateRange::month(*year, *month).ok(),
            QueryKey::UpcomingDates { from, .. } => Some(DateRange::upcoming(*from)),
            QueryKey::RecurringExpenses => None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Bookings(r)
            | QueryKey::Expenses(r)
            | QueryKey::RangeStats(r)
            | QueryKey::DeskStatistics(r) => write!(f, "{}:{}:{}", self.kind(), r.start, r.end),
            QueryKey::RecurringExpenses => write!(f, "{}", self.kind()),
            QueryKey::MonthlyStats { year, month } => {
                write!(f, "{}:{year:04}-{month:02}", self.kind())
            }
            QueryKey::UpcomingDates { from, limit } => {
                write!(f, "{}:{from}:{limit}", self.kind())
            }
        }
    }
}
