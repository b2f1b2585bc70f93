mod error;
mod operations;
mod seed;
mod types;

pub use error::BookingError;
pub use operations::{
    expand_bulk_command, sort_bookings, validate_booking, validate_booking_id, validate_booking_save,
    validate_bulk_command, validate_transition,
};
pub use seed::seed_desks;
pub use types::{Booking, BookingStatus, BulkAvailabilityCommand, Desk, SchemaVersion};
