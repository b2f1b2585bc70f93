use chrono::NaiveDate;
use thiserror::Error;

use crate::booking::BookingError;
use crate::expense::ExpenseError;
use crate::waitlist::WaitingListError;

/// Errors that can occur when constructing a date range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Invalid date range: start date must be before or equal to end date")]
    InvalidRange,
    #[error("Invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

/// An entity violated a schema or state-machine invariant.
///
/// Always raised before anything is written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error(transparent)]
    Expense(#[from] ExpenseError),
    #[error(transparent)]
    WaitingList(#[from] WaitingListError),
    #[error(transparent)]
    DateRange(#[from] DateRangeError),
}

/// A write or read could not be carried out by the backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Storage I/O failed: {0}")]
    Io(String),
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },
}

/// One `(desk, date)` pair a bulk command could not write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSlot {
    pub desk_id: String,
    pub date: NaiveDate,
    pub reason: String,
}

/// Errors returned by store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Bulk availability failed for {} desk-day(s), {applied} applied", .failed.len())]
    PartialBulk {
        failed: Vec<FailedSlot>,
        applied: usize,
    },
}

impl StoreError {
    /// Returns true if the error was raised before touching the backend.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

impl From<BookingError> for StoreError {
    fn from(err: BookingError) -> Self {
        StoreError::Validation(err.into())
    }
}

impl From<ExpenseError> for StoreError {
    fn from(err: ExpenseError) -> Self {
        StoreError::Validation(err.into())
    }
}

impl From<WaitingListError> for StoreError {
    fn from(err: WaitingListError) -> Self {
        StoreError::Validation(err.into())
    }
}

impl From<DateRangeError> for StoreError {
    fn from(err: DateRangeError) -> Self {
        StoreError::Validation(err.into())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
