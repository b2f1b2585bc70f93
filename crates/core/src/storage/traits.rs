use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::booking::{Booking, BulkAvailabilityCommand, Desk};
use crate::expense::{generate_for_month, stale_generated_ids, Expense, RecurringExpense};
use crate::realtime::ChangeFeed;
use crate::stats::{compute_desk_statistics, compute_period_stats, select_upcoming};
use crate::stats::{DeskStatistics, PeriodStats};

use super::{Capabilities, DateRange, Result};

/// Repository for desk bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Gets all bookings whose date falls within the range.
    async fn get_bookings_for_range(&self, range: DateRange) -> Result<Vec<Booking>>;

    /// Creates or replaces the booking for its `(desk_id, date)` key.
    ///
    /// Returns the record as stored (an existing id for the key is kept).
    async fn save_booking(&self, booking: &Booking) -> Result<Booking>;

    /// Deletes a booking by id. Returns `None` if it did not exist.
    async fn delete_booking(&self, id: &str) -> Result<Option<Booking>>;

    /// Overwrites every `(desk, date)` slot of the command.
    async fn apply_bulk_availability(
        &self,
        command: &BulkAvailabilityCommand,
    ) -> Result<Vec<Booking>>;
}

/// Repository for one-off and generated expenses.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Gets all expenses dated within the range.
    async fn get_expenses(&self, range: DateRange) -> Result<Vec<Expense>>;

    /// Gets an expense by id.
    async fn get_expense(&self, id: &str) -> Result<Option<Expense>>;

    /// Creates or replaces an expense.
    async fn save_expense(&self, expense: &Expense) -> Result<Expense>;

    /// Creates or replaces several expenses in one write.
    async fn save_expenses(&self, expenses: &[Expense]) -> Result<Vec<Expense>>;

    /// Deletes an expense by id. Returns `None` if it did not exist.
    async fn delete_expense(&self, id: &str) -> Result<Option<Expense>>;
}

/// Repository for recurring-expense rules.
#[async_trait]
pub trait RecurringExpenseStore: Send + Sync {
    /// Gets every rule, active or not.
    async fn get_recurring_expenses(&self) -> Result<Vec<RecurringExpense>>;

    /// Creates or replaces a rule.
    async fn save_recurring_expense(&self, rule: &RecurringExpense) -> Result<RecurringExpense>;

    /// Deletes a rule by id. Returns `None` if it did not exist.
    ///
    /// Expenses previously generated from the rule are left untouched.
    async fn delete_recurring_expense(&self, id: &str) -> Result<Option<RecurringExpense>>;
}

/// The full store surface the rest of the application works against.
///
/// Generation and statistics have provided implementations built on the
/// repository primitives, so every backend computes them identically.
#[async_trait]
pub trait DeskStore: BookingStore + ExpenseStore + RecurringExpenseStore {
    /// The seeded desks. Read-only after startup.
    fn desks(&self) -> &[Desk];

    /// What this backend supports.
    fn capabilities(&self) -> Capabilities;

    /// Row-level change notifications, if the backend has them.
    fn change_feed(&self) -> Option<Arc<dyn ChangeFeed>> {
        None
    }

    /// Materializes one expense per active rule for the given month.
    ///
    /// Generated ids are derived from `(rule, year, month)`, so running this
    /// twice for the same month overwrites instead of duplicating. Expenses
    /// an earlier run generated for a rule that is now inactive or deleted
    /// are removed, leaving the month with exactly this run's output.
    async fn generate_recurring_expenses(&self, year: i32, month: u32) -> Result<Vec<Expense>> {
        let period = DateRange::month(year, month)?;
        let rules = self.get_recurring_expenses().await?;
        let generated = generate_for_month(&rules, year, month, Utc::now())?;

        let existing = self.get_expenses(period).await?;
        for id in stale_generated_ids(&existing, &generated, year, month) {
            self.delete_expense(&id).await?;
        }

        if generated.is_empty() {
            return Ok(generated);
        }
        self.save_expenses(&generated).await
    }

    /// Occupancy and money totals for one calendar month.
    async fn get_monthly_stats(&self, year: i32, month: u32) -> Result<PeriodStats> {
        let range = DateRange::month(year, month)?;
        self.get_stats_for_date_range(range).await
    }

    /// Occupancy and money totals for an arbitrary range.
    async fn get_stats_for_date_range(&self, range: DateRange) -> Result<PeriodStats> {
        let bookings = self.get_bookings_for_range(range).await?;
        let expenses = self.get_expenses(range).await?;
        Ok(compute_period_stats(
            range,
            self.desks(),
            &bookings,
            &expenses,
        ))
    }

    /// Per-desk occupancy over a range.
    async fn get_desk_statistics(&self, range: DateRange) -> Result<Vec<DeskStatistics>> {
        let bookings = self.get_bookings_for_range(range).await?;
        Ok(compute_desk_statistics(self.desks(), &bookings))
    }

    /// Occupied bookings on or after `from`, soonest first.
    async fn get_upcoming_bookings(&self, from: NaiveDate, limit: usize) -> Result<Vec<Booking>> {
        let bookings = self
            .get_bookings_for_range(DateRange::upcoming(from))
            .await?;
        Ok(select_upcoming(bookings, from, limit))
    }
}
