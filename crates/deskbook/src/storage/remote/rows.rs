//! Row types for the hosted tables and their conversions.
//!
//! Pure functions, testable without a server. Enumerated columns are plain
//! text in the database, so a value this build does not know surfaces as a
//! serialization error instead of a panic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use deskbook_core::booking::Booking;
use deskbook_core::expense::{Expense, RecurringExpense};
use deskbook_core::storage::PersistenceError;

pub const BOOKINGS_TABLE: &str = "desk_bookings";
pub const EXPENSES_TABLE: &str = "expenses";
pub const RECURRING_EXPENSES_TABLE: &str = "recurring_expenses";

/// Conflict target of `desk_bookings` upserts: the natural key.
pub const BOOKINGS_CONFLICT: &str = "desk_id,date";
pub const ID_CONFLICT: &str = "id";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRow {
    pub id: String,
    pub desk_id: String,
    pub date: NaiveDate,
    pub status: String,
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.clone(),
            desk_id: booking.desk_id.clone(),
            date: booking.date,
            status: booking.status.as_str().to_string(),
            person_name: booking.person_name.clone(),
            title: booking.title.clone(),
            price: booking.price,
            created_at: booking.created_at,
        }
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = PersistenceError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e: String| {
            PersistenceError::Serialization(format!("booking {}: {e}", row.id))
        })?;
        Ok(Booking {
            id: row.id,
            desk_id: row.desk_id,
            date: row.date,
            status,
            person_name: non_blank(row.person_name),
            title: non_blank(row.title),
            price: row.price,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub recurring_expense_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.clone(),
            date: expense.date,
            amount: expense.amount,
            category: expense.category.to_string(),
            description: expense.description.clone(),
            recurring_expense_id: expense.recurring_expense_id.clone(),
            created_at: expense.created_at,
        }
    }
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = PersistenceError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        let category = row.category.parse().map_err(|e: String| {
            PersistenceError::Serialization(format!("expense {}: {e}", row.id))
        })?;
        Ok(Expense {
            id: row.id,
            date: row.date,
            amount: row.amount,
            category,
            description: row.description,
            recurring_expense_id: row.recurring_expense_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpenseRow {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub day_of_month: u32,
    pub active: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<&RecurringExpense> for RecurringExpenseRow {
    fn from(rule: &RecurringExpense) -> Self {
        Self {
            id: rule.id.clone(),
            description: rule.description.clone(),
            amount: rule.amount,
            category: rule.category.to_string(),
            day_of_month: rule.day_of_month,
            active: rule.active,
            start_date: rule.start_date,
            end_date: rule.end_date,
            created_at: rule.created_at,
        }
    }
}

impl TryFrom<RecurringExpenseRow> for RecurringExpense {
    type Error = PersistenceError;

    fn try_from(row: RecurringExpenseRow) -> Result<Self, Self::Error> {
        let category = row.category.parse().map_err(|e: String| {
            PersistenceError::Serialization(format!("recurring expense {}: {e}", row.id))
        })?;
        Ok(RecurringExpense {
            id: row.id,
            description: row.description,
            amount: row.amount,
            category,
            day_of_month: row.day_of_month,
            active: row.active,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
        })
    }
}

/// Converts every row, failing on the first one that does not map.
pub fn rows_into<R, T>(rows: Vec<R>) -> Result<Vec<T>, PersistenceError>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskbook_core::booking::BookingStatus;
    use deskbook_core::expense::ExpenseCategory;

    fn row(status: &str) -> BookingRow {
        BookingRow {
            id: "b1".to_string(),
            desk_id: "D1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            status: status.to_string(),
            person_name: Some(String::new()),
            title: None,
            price: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_booking_row_to_domain() {
        let booking = Booking::try_from(row("unavailable")).unwrap();

        assert_eq!(booking.status, BookingStatus::Unavailable);
        assert_eq!(booking.person_name, None);
    }

    #[test]
    fn test_unknown_status_is_serialization_error() {
        let result = Booking::try_from(row("archived"));
        assert!(matches!(result, Err(PersistenceError::Serialization(_))));
    }

    #[test]
    fn test_expense_row_keeps_category_text() {
        let expense = Expense::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 9.5, "Wifi")
            .with_category(ExpenseCategory::Internet);

        let row = ExpenseRow::from(&expense);
        assert_eq!(row.category, "internet");

        let back = Expense::try_from(row).unwrap();
        assert_eq!(back, expense);
    }

    #[test]
    fn test_rows_into_stops_on_bad_row() {
        let result: Result<Vec<Booking>, _> = rows_into(vec![row("booked"), row("nope")]);
        assert!(result.is_err());
    }
}
