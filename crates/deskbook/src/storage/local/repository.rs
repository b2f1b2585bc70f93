//! Desk store over JSON documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use deskbook_core::booking::{
    expand_bulk_command, sort_bookings, validate_booking_id, validate_booking_save,
    validate_bulk_command, Booking, BulkAvailabilityCommand, Desk, SchemaVersion,
};
use deskbook_core::expense::{
    validate_expense, validate_recurring_expense, Expense, RecurringExpense,
};
use deskbook_core::storage::{
    BookingStore, Capabilities, DateRange, DeskStore, ExpenseStore, RecurringExpenseStore, Result,
};

use crate::storage::document::{
    load_collection, store_collection, DocumentStorage, BOOKINGS_KEY, EXPENSES_KEY,
    RECURRING_EXPENSES_KEY,
};

/// Desk store persisted as one JSON document per collection.
///
/// There is no cross-call locking: two concurrent writers each read, modify
/// and write the whole document, and the last write wins.
#[derive(Clone)]
pub struct LocalStore {
    storage: Arc<dyn DocumentStorage>,
    desks: Vec<Desk>,
    version: SchemaVersion,
}

impl LocalStore {
    pub fn new(storage: Arc<dyn DocumentStorage>, desks: Vec<Desk>, version: SchemaVersion) -> Self {
        Self {
            storage,
            desks,
            version,
        }
    }

    pub fn schema_version(&self) -> SchemaVersion {
        self.version
    }

    async fn bookings(&self) -> Result<BTreeMap<String, Booking>> {
        Ok(load_collection(self.storage.as_ref(), BOOKINGS_KEY).await?)
    }

    async fn expenses(&self) -> Result<BTreeMap<String, Expense>> {
        Ok(load_collection(self.storage.as_ref(), EXPENSES_KEY).await?)
    }

    async fn rules(&self) -> Result<BTreeMap<String, RecurringExpense>> {
        Ok(load_collection(self.storage.as_ref(), RECURRING_EXPENSES_KEY).await?)
    }
}

#[async_trait]
impl BookingStore for LocalStore {
    async fn get_bookings_for_range(&self, range: DateRange) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .bookings()
            .await?
            .into_values()
            .filter(|b| range.contains(b.date))
            .collect();
        sort_bookings(&mut bookings);
        Ok(bookings)
    }

    async fn save_booking(&self, booking: &Booking) -> Result<Booking> {
        let mut records = self.bookings().await?;
        let existing = records.values().find(|b| b.key() == booking.key()).cloned();

        validate_booking_save(existing.as_ref(), booking, &self.desks, self.version)?;
        validate_booking_id(records.get(&booking.id), booking)?;

        let mut stored = booking.clone();
        if let Some(existing) = existing {
            stored.id = existing.id;
            stored.created_at = existing.created_at;
        }
        records.insert(stored.id.clone(), stored.clone());
        store_collection(self.storage.as_ref(), BOOKINGS_KEY, &records).await?;

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
        let mut records = self.bookings().await?;
        let Some(removed) = records.remove(id) else {
            return Ok(None);
        };
        store_collection(self.storage.as_ref(), BOOKINGS_KEY, &records).await?;

        tracing::debug!(booking_id = %id, "Booking deleted");
        Ok(Some(removed))
    }

    async fn apply_bulk_availability(
        &self,
        command: &BulkAvailabilityCommand,
    ) -> Result<Vec<Booking>> {
        let range = validate_bulk_command(command, &self.desks, self.version)?;

        let mut records = self.bookings().await?;
        let existing: Vec<Booking> = records
            .values()
            .filter(|b| range.contains(b.date) && command.desk_ids.contains(&b.desk_id))
            .cloned()
            .collect();

        let mut written = expand_bulk_command(command, range, &existing, Utc::now());
        for booking in &written {
            records.insert(booking.id.clone(), booking.clone());
        }
        // One document write: the whole command lands or none of it does
        store_collection(self.storage.as_ref(), BOOKINGS_KEY, &records).await?;

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
impl ExpenseStore for LocalStore {
    async fn get_expenses(&self, range: DateRange) -> Result<Vec<Expense>> {
        let mut expenses: Vec<Expense> = self
            .expenses()
            .await?
            .into_values()
            .filter(|e| range.contains(e.date))
            .collect();
        expenses.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(expenses)
    }

    async fn get_expense(&self, id: &str) -> Result<Option<Expense>> {
        Ok(self.expenses().await?.remove(id))
    }

    async fn save_expense(&self, expense: &Expense) -> Result<Expense> {
        validate_expense(expense)?;

        let mut records = self.expenses().await?;
        records.insert(expense.id.clone(), expense.clone());
        store_collection(self.storage.as_ref(), EXPENSES_KEY, &records).await?;

        tracing::debug!(expense_id = %expense.id, date = %expense.date, "Expense saved");
        Ok(expense.clone())
    }

    async fn save_expenses(&self, expenses: &[Expense]) -> Result<Vec<Expense>> {
        for expense in expenses {
            validate_expense(expense)?;
        }

        let mut records = self.expenses().await?;
        for expense in expenses {
            records.insert(expense.id.clone(), expense.clone());
        }
        store_collection(self.storage.as_ref(), EXPENSES_KEY, &records).await?;

        tracing::debug!(count = expenses.len(), "Expenses saved");
        Ok(expenses.to_vec())
    }

    async fn delete_expense(&self, id: &str) -> Result<Option<Expense>> {
        let mut records = self.expenses().await?;
        let Some(removed) = records.remove(id) else {
            return Ok(None);
        };
        store_collection(self.storage.as_ref(), EXPENSES_KEY, &records).await?;

        tracing::debug!(expense_id = %id, "Expense deleted");
        Ok(Some(removed))
    }
}

#[async_trait]
impl RecurringExpenseStore for LocalStore {
    async fn get_recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        let mut rules: Vec<RecurringExpense> = self.rules().await?.into_values().collect();
        rules.sort_by(|a, b| {
            a.day_of_month
                .cmp(&b.day_of_month)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rules)
    }

    async fn save_recurring_expense(&self, rule: &RecurringExpense) -> Result<RecurringExpense> {
        validate_recurring_expense(rule)?;

        let mut records = self.rules().await?;
        records.insert(rule.id.clone(), rule.clone());
        store_collection(self.storage.as_ref(), RECURRING_EXPENSES_KEY, &records).await?;

        tracing::debug!(rule_id = %rule.id, active = rule.active, "Recurring expense saved");
        Ok(rule.clone())
    }

    async fn delete_recurring_expense(&self, id: &str) -> Result<Option<RecurringExpense>> {
        let mut records = self.rules().await?;
        let Some(removed) = records.remove(id) else {
            return Ok(None);
        };
        store_collection(self.storage.as_ref(), RECURRING_EXPENSES_KEY, &records).await?;

        tracing::debug!(rule_id = %id, "Recurring expense deleted");
        Ok(Some(removed))
    }
}

#[async_trait]
impl DeskStore for LocalStore {
    fn desks(&self) -> &[Desk] {
        &self.desks
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::without_subscribe()
    }
}
