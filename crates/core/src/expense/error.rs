use thiserror::Error;

/// Errors raised when an expense or recurring rule is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpenseError {
    #[error("Expense description cannot be empty")]
    EmptyDescription,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Day of month must be between 1 and 31, got {0}")]
    InvalidDayOfMonth(u32),
    #[error("Rule end date must be on or after its start date")]
    InvalidWindow,
}
