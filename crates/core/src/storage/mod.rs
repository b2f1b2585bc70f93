mod error;
mod http_mapping;
mod traits;
mod types;

pub use error::{
    DateRangeError, FailedSlot, PersistenceError, Result, StoreError, ValidationError,
};
pub use http_mapping::status_code_to_persistence_error;
pub use traits::{BookingStore, DeskStore, ExpenseStore, RecurringExpenseStore};
pub use types::{Capabilities, DateRange, UPCOMING_WINDOW_DAYS};
