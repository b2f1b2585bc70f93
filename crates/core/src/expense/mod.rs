mod error;
mod operations;
mod recurring;
mod types;

pub use error::ExpenseError;
pub use operations::{validate_expense, validate_recurring_expense};
pub use recurring::{
    clamp_day, generate_for_month, generated_expense_id, is_active_in, stale_generated_ids,
};
pub use types::{Expense, ExpenseCategory, RecurringExpense};
