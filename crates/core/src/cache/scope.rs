//! Invalidation scopes: which cached reads a mutation may have affected.

use serde::{Deserialize, Serialize};

use crate::storage::DateRange;

use super::{QueryKey, QueryKind};

const BOOKING_KINDS: &[QueryKind] = &[
    QueryKind::Bookings,
    QueryKind::MonthlyStats,
    QueryKind::RangeStats,
    QueryKind::DeskStatistics,
    QueryKind::UpcomingDates,
];

const EXPENSE_KINDS: &[QueryKind] = &[
    QueryKind::Expenses,
    QueryKind::MonthlyStats,
    QueryKind::RangeStats,
];

/// A set of query kinds, optionally restricted to a period.
///
/// A key matches when its kind is listed and its period overlaps the scope's
/// period. A scope without a period covers all dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationScope {
    pub kinds: Vec<QueryKind>,
    pub period: Option<DateRange>,
}

impl InvalidationScope {
    pub fn new(kinds: &[QueryKind], period: Option<DateRange>) -> Self {
        let mut kinds = kinds.to_vec();
        kinds.sort();
        kinds.dedup();
        Self { kinds, period }
    }

    /// After a booking save, delete or bulk command over `period`.
    pub fn bookings(period: DateRange) -> Self {
        Self::new(BOOKING_KINDS, Some(period))
    }

    /// After a remote change whose dates are unknown.
    pub fn all_bookings() -> Self {
        Self::new(BOOKING_KINDS, None)
    }

    /// After an expense save or delete, or a generation run, over `period`.
    pub fn expenses(period: DateRange) -> Self {
        Self::new(EXPENSE_KINDS, Some(period))
    }

    /// After an expense mutation whose previous date could not be read.
    pub fn all_expenses() -> Self {
        Self::new(EXPENSE_KINDS, None)
    }

    /// After a recurring rule changed. Materialized expenses are untouched.
    pub fn recurring_expenses() -> Self {
        Self::new(&[QueryKind::RecurringExpenses], None)
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        if !self.kinds.contains(&key.kind()) {
            return false;
        }
        match (self.period, key.period()) {
            (Some(scope), Some(cached)) => scope.overlaps(&cached),
            _ => true,
        }
    }
}

/// An invalidation raised outside the mutation path, such as a change
/// notification from another client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationEvent {
    /// Table the notification came from.
    pub source: String,
    pub scope: InvalidationScope,
}

impl InvalidationEvent {
    pub fn new(source: impl Into<String>, scope: InvalidationScope) -> Self {
        Self {
            source: source.into(),
            scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_booking_scope_matches_overlapping_keys() {
        let scope = InvalidationScope::bookings(DateRange::day(date(2024, 3, 15)));

        assert!(scope.matches(&QueryKey::Bookings(DateRange::month(2024, 3).unwrap())));
        assert!(scope.matches(&QueryKey::MonthlyStats {
            year: 2024,
            month: 3
        }));
        assert!(scope.matches(&QueryKey::UpcomingDates {
            from: date(2024, 3, 1),
            limit: 10
        }));
        assert!(!scope.matches(&QueryKey::MonthlyStats {
            year: 2024,
            month: 4
        }));
        assert!(!scope.matches(&QueryKey::Expenses(DateRange::month(2024, 3).unwrap())));
    }

    #[test]
    fn test_expense_scope_skips_booking_only_kinds() {
        let scope = InvalidationScope::expenses(DateRange::month(2024, 3).unwrap());
        let march = DateRange::month(2024, 3).unwrap();

        assert!(scope.matches(&QueryKey::Expenses(march)));
        assert!(scope.matches(&QueryKey::RangeStats(march)));
        assert!(!scope.matches(&QueryKey::Bookings(march)));
        assert!(!scope.matches(&QueryKey::DeskStatistics(march)));
        assert!(!scope.matches(&QueryKey::RecurringExpenses));
    }

    #[test]
    fn test_recurring_scope_never_touches_expenses() {
        let scope = InvalidationScope::recurring_expenses();

        assert!(scope.matches(&QueryKey::RecurringExpenses));
        assert!(!scope.matches(&QueryKey::Expenses(DateRange::month(2024, 3).unwrap())));
    }

    #[test]
    fn test_all_bookings_scope_ignores_period() {
        let scope = InvalidationScope::all_bookings();

        assert!(scope.matches(&QueryKey::Bookings(DateRange::month(1999, 1).unwrap())));
        assert!(scope.matches(&QueryKey::MonthlyStats {
            year: 2030,
            month: 12
        }));
    }

    #[test]
    fn test_new_dedups_kinds() {
        let scope = InvalidationScope::new(&[QueryKind::Bookings, QueryKind::Bookings], None);
        assert_eq!(scope.kinds, vec![QueryKind::Bookings]);
    }
}
