use chrono::NaiveDate;
use thiserror::Error;

use super::types::{BookingStatus, SchemaVersion};

/// Errors raised when a booking or bulk command breaks an invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("A {status} booking requires a person name")]
    MissingPersonName { status: BookingStatus },
    #[error("A {status} booking cannot carry a person, title or price")]
    UnexpectedPersonFields { status: BookingStatus },
    #[error("A {status} booking cannot carry a price")]
    PriceNotAllowed { status: BookingStatus },
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("Status {status} is not part of schema {version}")]
    UnsupportedStatus {
        status: BookingStatus,
        version: SchemaVersion,
    },
    #[error("Cannot move a booking from {from} to {to}")]
    IllegalTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("Booking id {id} already belongs to desk {desk_id} on {date}")]
    IdTaken {
        id: String,
        desk_id: String,
        date: NaiveDate,
    },
    #[error("Unknown desk: {0}")]
    UnknownDesk(String),
    #[error("Bulk command must name at least one desk")]
    EmptyDeskSelection,
}
