//! Desk store over the hosted PostgREST tables.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use deskbook_core::booking::{
    expand_bulk_command, sort_bookings, validate_booking_id, validate_booking_save,
    validate_bulk_command, Booking, BulkAvailabilityCommand, Desk, SchemaVersion,
};
use deskbook_core::expense::{
    validate_expense, validate_recurring_expense, Expense, RecurringExpense,
};
use deskbook_core::realtime::ChangeFeed;
use deskbook_core::storage::{
    BookingStore, Capabilities, DateRange, DeskStore, ExpenseStore, FailedSlot, PersistenceError,
    RecurringExpenseStore, Result, StoreError,
};

use crate::config::RemoteSettings;

use super::client::{eq, RestClient};
use super::feed::SseChangeFeed;
use super::rows::{
    rows_into, BookingRow, ExpenseRow, RecurringExpenseRow, BOOKINGS_CONFLICT, BOOKINGS_TABLE,
    EXPENSES_TABLE, ID_CONFLICT, RECURRING_EXPENSES_TABLE,
};

/// Desk store backed by the hosted relational service.
///
/// Single-entity writes are one request each. A bulk command is sent as one
/// upsert per desk, so it can partially succeed.
#[derive(Clone)]
pub struct RemoteStore {
    client: RestClient,
    feed: Arc<dyn ChangeFeed>,
    desks: Vec<Desk>,
    version: SchemaVersion,
}

impl RemoteStore {
    pub fn new(settings: &RemoteSettings, desks: Vec<Desk>, version: SchemaVersion) -> Self {
        let client = RestClient::new(settings);
        Self {
            feed: Arc::new(SseChangeFeed::new(client.clone())),
            client,
            desks,
            version,
        }
    }

    async fn booking_at(&self, desk_id: &str, date: NaiveDate) -> Result<Option<Booking>> {
        let rows: Vec<BookingRow> = self
            .client
            .select(
                BOOKINGS_TABLE,
                &[("desk_id", eq(desk_id)), ("date", eq(date))],
            )
            .await?;
        Ok(rows_into::<_, Booking>(rows)?.into_iter().next())
    }

    async fn booking_by_id(&self, id: &str) -> Result<Option<Booking>> {
        let rows: Vec<BookingRow> = self.client.select(BOOKINGS_TABLE, &[("id", eq(id))]).await?;
        Ok(rows_into::<_, Booking>(rows)?.into_iter().next())
    }

    async fn bookings_in(&self, range: DateRange, desk_ids: &[String]) -> Result<Vec<Booking>> {
        let mut filters = range_filters(range);
        filters.push(("desk_id", format!("in.({})", desk_ids.join(","))));
        let rows: Vec<BookingRow> = self.client.select(BOOKINGS_TABLE, &filters).await?;
        Ok(rows_into(rows)?)
    }
}

fn range_filters(range: DateRange) -> Vec<(&'static str, String)> {
    vec![
        ("date", format!("gte.{}", range.start)),
        ("date", format!("lte.{}", range.end)),
    ]
}

fn first_row<T>(rows: Vec<T>, what: &str) -> std::result::Result<T, PersistenceError> {
    rows.into_iter().next().ok_or_else(|| {
        PersistenceError::Serialization(format!("{what} upsert returned no representation"))
    })
}

#[async_trait]
impl BookingStore for RemoteStore {
    async fn get_bookings_for_range(&self, range: DateRange) -> Result<Vec<Booking>> {
        let rows: Vec<BookingRow> = self
            .client
            .select(BOOKINGS_TABLE, &range_filters(range))
            .await?;
        let mut bookings: Vec<Booking> = rows_into(rows)?;
        sort_bookings(&mut bookings);
        Ok(bookings)
    }

    async fn save_booking(&self, booking: &Booking) -> Result<Booking> {
        let existing = self.booking_at(&booking.desk_id, booking.date).await?;
        validate_booking_save(existing.as_ref(), booking, &self.desks, self.version)?;
        if existing.as_ref().is_none_or(|b| b.id != booking.id) {
            let holder = self.booking_by_id(&booking.id).await?;
            validate_booking_id(holder.as_ref(), booking)?;
        }

        let mut row = BookingRow::from(booking);
        if let Some(existing) = existing {
            row.id = existing.id;
            row.created_at = existing.created_at;
        }

        let rows: Vec<BookingRow> = self
            .client
            .upsert(BOOKINGS_TABLE, BOOKINGS_CONFLICT, &[row])
            .await?;
        let stored = Booking::try_from(first_row(rows, "booking")?)?;

        tracing::debug!(
            booking_id = %stored.id,
            desk_id = %stored.desk_id,
            date = %stored.date,
            status = %stored.status,
            "Booking saved"
        );
        Ok(stored)
    }

    async fn delete_booking(&self, id: &str) -> Result<Option<Booking>> {
        let rows: Vec<BookingRow> = self.client.delete(BOOKINGS_TABLE, &[("id", eq(id))]).await?;
        let removed = rows_into::<_, Booking>(rows)?.into_iter().next();
        if removed.is_some() {
            tracing::debug!(booking_id = %id, "Booking deleted");
        }
        Ok(removed)
    }

    async fn apply_bulk_availability(
        &self,
        command: &BulkAvailabilityCommand,
    ) -> Result<Vec<Booking>> {
        let range = validate_bulk_command(command, &self.desks, self.version)?;
        let existing = self.bookings_in(range, &command.desk_ids).await?;
        let expanded = expand_bulk_command(command, range, &existing, Utc::now());

        let mut written = Vec::with_capacity(expanded.len());
        let mut failed = Vec::new();

        let mut desk_ids: Vec<&str> = Vec::new();
        for booking in &expanded {
            if !desk_ids.contains(&booking.desk_id.as_str()) {
                desk_ids.push(booking.desk_id.as_str());
            }
        }

        for desk_id in desk_ids {
            let slots: Vec<&Booking> = expanded.iter().filter(|b| b.desk_id == desk_id).collect();
            let rows: Vec<BookingRow> = slots.iter().map(|b| BookingRow::from(*b)).collect();

            let outcome = match self
                .client
                .upsert::<_, BookingRow>(BOOKINGS_TABLE, BOOKINGS_CONFLICT, &rows)
                .await
            {
                Ok(stored) => rows_into::<_, Booking>(stored),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(stored) => written.extend(stored),
                Err(err) => {
                    tracing::warn!(%desk_id, error = %err, "Bulk availability failed for desk");
                    failed.extend(slots.iter().map(|b| FailedSlot {
                        desk_id: b.desk_id.clone(),
                        date: b.date,
                        reason: err.to_string(),
                    }));
                }
            }
        }

        if !failed.is_empty() {
            return Err(StoreError::PartialBulk {
                failed,
                applied: written.len(),
            });
        }

        sort_bookings(&mut written);
        tracing::debug!(
            start = %range.start,
            end = %range.end,
            status = %command.status,
            count = written.len(),
            "Bulk availability applied"
        );
        Ok(written)
    }
}

#[async_trait]
impl ExpenseStore for RemoteStore {
    async fn get_expenses(&self, range: DateRange) -> Result<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = self
            .client
            .select(EXPENSES_TABLE, &range_filters(range))
            .await?;
        let mut expenses: Vec<Expense> = rows_into(rows)?;
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(expenses)
    }

    async fn get_expense(&self, id: &str) -> Result<Option<Expense>> {
        let rows: Vec<ExpenseRow> = self.client.select(EXPENSES_TABLE, &[("id", eq(id))]).await?;
        Ok(rows_into::<_, Expense>(rows)?.into_iter().next())
    }

    async fn save_expense(&self, expense: &Expense) -> Result<Expense> {
        validate_expense(expense)?;

        let rows: Vec<ExpenseRow> = self
            .client
            .upsert(EXPENSES_TABLE, ID_CONFLICT, &[ExpenseRow::from(expense)])
            .await?;
        let stored = Expense::try_from(first_row(rows, "expense")?)?;

        tracing::debug!(expense_id = %stored.id, date = %stored.date, "Expense saved");
        Ok(stored)
    }

    async fn save_expenses(&self, expenses: &[Expense]) -> Result<Vec<Expense>> {
        for expense in expenses {
            validate_expense(expense)?;
        }
        if expenses.is_empty() {
            return Ok(Vec::new());
        }

        let body: Vec<ExpenseRow> = expenses.iter().map(ExpenseRow::from).collect();
        let rows: Vec<ExpenseRow> = self.client.upsert(EXPENSES_TABLE, ID_CONFLICT, &body).await?;
        let stored: Vec<Expense> = rows_into(rows)?;

        tracing::debug!(count = stored.len(), "Expenses saved");
        Ok(stored)
    }

    async fn delete_expense(&self, id: &str) -> Result<Option<Expense>> {
        let rows: Vec<ExpenseRow> = self.client.delete(EXPENSES_TABLE, &[("id", eq(id))]).await?;
        let removed = rows_into::<_, Expense>(rows)?.into_iter().next();
        if removed.is_some() {
            tracing::debug!(expense_id = %id, "Expense deleted");
        }
        Ok(removed)
    }
}

#[async_trait]
impl RecurringExpenseStore for RemoteStore {
    async fn get_recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        let rows: Vec<RecurringExpenseRow> = self
            .client
            .select(RECURRING_EXPENSES_TABLE, &[("order", "day_of_month.asc,id.asc".to_string())])
            .await?;
        Ok(rows_into(rows)?)
    }

    async fn save_recurring_expense(&self, rule: &RecurringExpense) -> Result<RecurringExpense> {
        validate_recurring_expense(rule)?;

        let rows: Vec<RecurringExpenseRow> = self
            .client
            .upsert(
                RECURRING_EXPENSES_TABLE,
                ID_CONFLICT,
                &[RecurringExpenseRow::from(rule)],
            )
            .await?;
        let stored = RecurringExpense::try_from(first_row(rows, "recurring expense")?)?;

        tracing::debug!(rule_id = %stored.id, active = stored.active, "Recurring expense saved");
        Ok(stored)
    }

    async fn delete_recurring_expense(&self, id: &str) -> Result<Option<RecurringExpense>> {
        let rows: Vec<RecurringExpenseRow> = self
            .client
            .delete(RECURRING_EXPENSES_TABLE, &[("id", eq(id))])
            .await?;
        let removed = rows_into::<_, RecurringExpense>(rows)?.into_iter().next();
        if removed.is_some() {
            tracing::debug!(rule_id = %id, "Recurring expense deleted");
        }
        Ok(removed)
    }
}

#[async_trait]
impl DeskStore for RemoteStore {
    fn desks(&self) -> &[Desk] {
        &self.desks
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::with_subscribe()
    }

    fn change_feed(&self) -> Option<Arc<dyn ChangeFeed>> {
        Some(self.feed.clone())
    }
}
