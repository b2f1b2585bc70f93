//! Cached desk store decorator.
//!
//! Wraps a `DeskStore` implementation with the cache-aside pattern and
//! scope-based invalidation after every successful mutation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use deskbook_core::booking::{Booking, BulkAvailabilityCommand, Desk};
use deskbook_core::cache::{decode, encode, InvalidationScope, QueryCache, QueryKey};
use deskbook_core::expense::{Expense, RecurringExpense};
use deskbook_core::realtime::ChangeFeed;
use deskbook_core::stats::{DeskStatistics, PeriodStats};
use deskbook_core::storage::{
    BookingStore, Capabilities, DateRange, DeskStore, ExpenseStore, RecurringExpenseStore, Result,
    StoreError,
};

/// Cached desk store decorator.
///
/// - **Reads**: check the cache first; on a miss fetch from the store, retrying
///   a failed fetch up to `read_retries` times, and populate the cache unless
///   an invalidation happened while the fetch was in flight.
/// - **Writes**: persist to the store (never retried), then invalidate every
///   cached read whose scope the mutation may have affected.
///
/// Cache failures are logged and never fail the operation.
pub struct CachedStore<S, C>
where
    S: DeskStore + ?Sized,
    C: QueryCache + ?Sized,
{
    store: Arc<S>,
    cache: Arc<C>,
    ttl: Duration,
    read_retries: u32,
}

impl<S, C> CachedStore<S, C>
where
    S: DeskStore + ?Sized,
    C: QueryCache + ?Sized,
{
    /// Creates a new cached store.
    ///
    /// # Arguments
    ///
    /// * `store` - The underlying store to cache
    /// * `cache` - The cache implementation
    /// * `ttl` - How long a cached read is served before it is refetched
    /// * `read_retries` - Extra attempts for a failed read
    pub fn new(store: Arc<S>, cache: Arc<C>, ttl: Duration, read_retries: u32) -> Self {
        Self {
            store,
            cache,
            ttl,
            read_retries,
        }
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    async fn cached_read<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T>> + Send,
    {
        if let Ok(Some(bytes)) = self.cache.get(&key).await {
            match decode::<T>(&bytes) {
                Ok(value) => {
                    tracing::trace!(%key, "Cache hit");
                    return Ok(value);
                }
                // Treat as a miss
                Err(err) => tracing::warn!(%key, error = %err, "Cached value failed to decode"),
            }
        }

        tracing::trace!(%key, "Cache miss");
        let observed_epoch = self.cache.epoch().await;
        let value = self.fetch_with_retry(&key, fetch).await?;

        match encode(&value) {
            Ok(bytes) => match self
                .cache
                .set(&key, &bytes, Some(self.ttl), observed_epoch)
                .await
            {
                Ok(true) => {}
                Ok(false) => tracing::trace!(%key, "Discarded result fetched before invalidation"),
                Err(err) => tracing::warn!(%key, error = %err, "Failed to cache query result"),
            },
            Err(err) => tracing::warn!(%key, error = %err, "Failed to encode query result"),
        }

        Ok(value)
    }

    async fn fetch_with_retry<T, F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match fetch().await {
                Err(err) if !err.is_validation() && attempt < self.read_retries => {
                    attempt += 1;
                    tracing::warn!(%key, attempt, error = %err, "Read failed, retrying");
                }
                result => return result,
            }
        }
    }

    async fn invalidate(&self, scope: InvalidationScope) {
        match self.cache.invalidate(&scope).await {
            Ok(dropped) => tracing::trace!(kinds = ?scope.kinds, dropped, "Invalidated cached queries"),
            Err(err) => tracing::warn!(
                kinds = ?scope.kinds,
                error = %err,
                "Failed to invalidate cached queries"
            ),
        }
    }

    /// Scope covering an expense's previous date, when it can be read.
    async fn previous_expense_scope(&self, id: &str) -> Option<InvalidationScope> {
        match self.store.get_expense(id).await {
            Ok(Some(previous)) => Some(InvalidationScope::expenses(DateRange::day(previous.date))),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(expense_id = %id, error = %err, "Could not read previous expense");
                Some(InvalidationScope::all_expenses())
            }
        }
    }
}

#[async_trait]
impl<S, C> BookingStore for CachedStore<S, C>
where
    S: DeskStore + ?Sized + 'static,
    C: QueryCache + ?Sized + 'static,
{
    async fn get_bookings_for_range(&self, range: DateRange) -> Result<Vec<Booking>> {
        self.cached_read(QueryKey::Bookings(range), || {
            self.store.get_bookings_for_range(range)
        })
        .await
    }

    async fn save_booking(&self, booking: &Booking) -> Result<Booking> {
        let saved = self.store.save_booking(booking).await?;
        self.invalidate(InvalidationScope::bookings(DateRange::day(saved.date)))
            .await;
        Ok(saved)
    }

    async fn delete_booking(&self, id: &str) -> Result<Option<Booking>> {
        let removed = self.store.delete_booking(id).await?;
        if let Some(ref booking) = removed {
            self.invalidate(InvalidationScope::bookings(DateRange::day(booking.date)))
                .await;
        }
        Ok(removed)
    }

    async fn apply_bulk_availability(
        &self,
        command: &BulkAvailabilityCommand,
    ) -> Result<Vec<Booking>> {
        let result = self.store.apply_bulk_availability(command).await;

        // A partially applied command still changed some slots
        let changed = matches!(result, Ok(_) | Err(StoreError::PartialBulk { .. }));
        if changed {
            if let Ok(range) = DateRange::new(command.start_date, command.end_date) {
                self.invalidate(InvalidationScope::bookings(range)).await;
            }
        }
        result
    }
}

#[async_trait]
impl<S, C> ExpenseStore for CachedStore<S, C>
where
    S: DeskStore + ?Sized + 'static,
    C: QueryCache + ?Sized + 'static,
{
    async fn get_expenses(&self, range: DateRange) -> Result<Vec<Expense>> {
        self.cached_read(QueryKey::Expenses(range), || self.store.get_expenses(range))
            .await
    }

    async fn get_expense(&self, id: &str) -> Result<Option<Expense>> {
        self.store.get_expense(id).await
    }

    async fn save_expense(&self, expense: &Expense) -> Result<Expense> {
        let previous = self.previous_expense_scope(&expense.id).await;
        let saved = self.store.save_expense(expense).await?;

        if let Some(scope) = previous {
            self.invalidate(scope).await;
        }
        self.invalidate(InvalidationScope::expenses(DateRange::day(saved.date)))
            .await;
        Ok(saved)
    }

    async fn save_expenses(&self, expenses: &[Expense]) -> Result<Vec<Expense>> {
        let mut scopes = Vec::new();
        for expense in expenses {
            if let Some(scope) = self.previous_expense_scope(&expense.id).await {
                scopes.push(scope);
            }
        }

        let saved = self.store.save_expenses(expenses).await?;

        let span = saved
            .iter()
            .map(|e| DateRange::day(e.date))
            .reduce(|a, b| a.span(&b));
        if let Some(span) = span {
            scopes.push(InvalidationScope::expenses(span));
        }
        for scope in scopes {
            self.invalidate(scope).await;
        }
        Ok(saved)
    }

    async fn delete_expense(&self, id: &str) -> Result<Option<Expense>> {
        let removed = self.store.delete_expense(id).await?;
        if let Some(ref expense) = removed {
            self.invalidate(InvalidationScope::expenses(DateRange::day(expense.date)))
                .await;
        }
        Ok(removed)
    }
}

#[async_trait]
impl<S, C> RecurringExpenseStore for CachedStore<S, C>
where
    S: DeskStore + ?Sized + 'static,
    C: QueryCache + ?Sized + 'static,
{
    async fn get_recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        self.cached_read(QueryKey::RecurringExpenses, || {
            self.store.get_recurring_expenses()
        })
        .await
    }

    async fn save_recurring_expense(&self, rule: &RecurringExpense) -> Result<RecurringExpense> {
        let saved = self.store.save_recurring_expense(rule).await?;
        self.invalidate(InvalidationScope::recurring_expenses()).await;
        Ok(saved)
    }

    async fn delete_recurring_expense(&self, id: &str) -> Result<Option<RecurringExpense>> {
        let removed = self.store.delete_recurring_expense(id).await?;
        if removed.is_some() {
            self.invalidate(InvalidationScope::recurring_expenses()).await;
        }
        Ok(removed)
    }
}

#[async_trait]
impl<S, C> DeskStore for CachedStore<S, C>
where
    S: DeskStore + ?Sized + 'static,
    C: QueryCache + ?Sized + 'static,
{
    fn desks(&self) -> &[Desk] {
        self.store.desks()
    }

    fn capabilities(&self) -> Capabilities {
        self.store.capabilities()
    }

    fn change_feed(&self) -> Option<Arc<dyn ChangeFeed>> {
        self.store.change_feed()
    }

    async fn generate_recurring_expenses(&self, year: i32, month: u32) -> Result<Vec<Expense>> {
        // Validate first so an invalid month is a validation error, not a fetch
        let period = DateRange::month(year, month)?;
        let generated = self.store.generate_recurring_expenses(year, month).await?;
        // Even an empty run may have removed expenses of a retired rule
        self.invalidate(InvalidationScope::expenses(period)).await;
        tracing::debug!(year, month, count = generated.len(), "Recurring expenses generated");
        Ok(generated)
    }

    async fn get_monthly_stats(&self, year: i32, month: u32) -> Result<PeriodStats> {
        DateRange::month(year, month)?;
        self.cached_read(QueryKey::MonthlyStats { year, month }, || {
            self.store.get_monthly_stats(year, month)
        })
        .await
    }

    async fn get_stats_for_date_range(&self, range: DateRange) -> Result<PeriodStats> {
        self.cached_read(QueryKey::RangeStats(range), || {
            self.store.get_stats_for_date_range(range)
        })
        .await
    }

    async fn get_desk_statistics(&self, range: DateRange) -> Result<Vec<DeskStatistics>> {
        self.cached_read(QueryKey::DeskStatistics(range), || {
            self.store.get_desk_statistics(range)
        })
        .await
    }

    async fn get_upcoming_bookings(&self, from: NaiveDate, limit: usize) -> Result<Vec<Booking>> {
        self.cached_read(QueryKey::UpcomingDates { from, limit }, || {
            self.store.get_upcoming_bookings(from, limit)
        })
        .await
    }
}
