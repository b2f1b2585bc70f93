use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::serde::deserialize_optional_string;

use super::error::BookingError;

/// A physical desk, identified by room and number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desk {
    pub id: String,
    pub room: String,
    pub number: u32,
    pub label: String,
}

impl Desk {
    /// Creates a desk labelled "{room} {number}".
    pub fn new(id: impl Into<String>, room: impl Into<String>, number: u32) -> Self {
        let room = room.into();
        Self {
            id: id.into(),
            label: format!("{room} {number}"),
            room,
            number,
        }
    }

    /// Sets a custom label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Revision of the booking status enumeration a store speaks.
///
/// `V1` predates the `unavailable` status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    V1,
    #[default]
    V2,
}

impl SchemaVersion {
    /// Returns true if `status` exists in this revision.
    pub fn supports(&self, status: BookingStatus) -> bool {
        status.introduced_in() <= *self
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(SchemaVersion::V1),
            "v2" | "2" => Ok(SchemaVersion::V2),
            other => Err(format!("unknown schema version: {other}")),
        }
    }
}

/// Occupancy state of a desk on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum BookingStatus {
    Available,
    Booked,
    Assigned,
    /// Desk blocked for the day. Only exists from schema `V2` on.
    Unavailable,
}

impl BookingStatus {
    /// Statuses that require a person and count as occupied.
    pub fn is_occupied(&self) -> bool {
        matches!(self, BookingStatus::Booked | BookingStatus::Assigned)
    }

    /// Returns true if a price may be attached.
    pub fn allows_price(&self) -> bool {
        matches!(self, BookingStatus::Booked)
    }

    /// The schema revision that introduced this status.
    pub fn introduced_in(&self) -> SchemaVersion {
        match self {
            BookingStatus::Unavailable => SchemaVersion::V2,
            _ => SchemaVersion::V1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Available => "available",
            BookingStatus::Booked => "booked",
            BookingStatus::Assigned => "assigned",
            BookingStatus::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(BookingStatus::Available),
            "booked" => Ok(BookingStatus::Booked),
            "assigned" => Ok(BookingStatus::Assigned),
            "unavailable" => Ok(BookingStatus::Unavailable),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// The occupancy record of one desk on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub desk_id: String,
    pub date: NaiveDate,
    pub status: BookingStatus,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub person_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// The id a new booking gets from its natural key.
    pub fn natural_id(desk_id: &str, date: NaiveDate) -> String {
        format!("{desk_id}:{date}")
    }

    /// Creates an available booking for a desk and day.
    pub fn available(desk_id: impl Into<String>, date: NaiveDate) -> Self {
        let desk_id = desk_id.into();
        Self {
            id: Self::natural_id(&desk_id, date),
            desk_id,
            date,
            status: BookingStatus::Available,
            person_name: None,
            title: None,
            price: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a booked record for a person.
    pub fn booked(
        desk_id: impl Into<String>,
        date: NaiveDate,
        person_name: impl Into<String>,
    ) -> Self {
        let mut booking = Self::available(desk_id, date);
        booking.status = BookingStatus::Booked;
        booking.person_name = Some(person_name.into());
        booking
    }

    /// Returns the `(desk_id, date)` natural key.
    pub fn key(&self) -> (&str, NaiveDate) {
        (&self.desk_id, self.date)
    }

    /// available → booked.
    pub fn book(
        self,
        person_name: impl Into<String>,
        price: Option<f64>,
    ) -> Result<Self, BookingError> {
        self.expect_status(&[BookingStatus::Available], BookingStatus::Booked)?;
        Ok(Self {
            status: BookingStatus::Booked,
            person_name: Some(person_name.into()),
            price,
            ..self
        })
    }

    /// available → assigned. Assigned desks never carry a price.
    pub fn assign(self, person_name: impl Into<String>) -> Result<Self, BookingError> {
        self.expect_status(&[BookingStatus::Available], BookingStatus::Assigned)?;
        Ok(Self {
            status: BookingStatus::Assigned,
            person_name: Some(person_name.into()),
            price: None,
            ..self
        })
    }

    /// booked/assigned → available, clearing person, title and price.
    pub fn release(self) -> Result<Self, BookingError> {
        self.expect_status(
            &[BookingStatus::Booked, BookingStatus::Assigned],
            BookingStatus::Available,
        )?;
        Ok(self.cleared(BookingStatus::Available))
    }

    /// available → unavailable.
    pub fn block(self) -> Result<Self, BookingError> {
        self.expect_status(&[BookingStatus::Available], BookingStatus::Unavailable)?;
        Ok(self.cleared(BookingStatus::Unavailable))
    }

    /// unavailable → available.
    pub fn unblock(self) -> Result<Self, BookingError> {
        self.expect_status(&[BookingStatus::Unavailable], BookingStatus::Available)?;
        Ok(self.cleared(BookingStatus::Available))
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets a specific ID (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets a specific creation timestamp (useful for testing).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    fn cleared(self, status: BookingStatus) -> Self {
        Self {
            status,
            person_name: None,
            title: None,
            price: None,
            ..self
        }
    }

    fn expect_status(
        &self,
        allowed: &[BookingStatus],
        to: BookingStatus,
    ) -> Result<(), BookingError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(BookingError::IllegalTransition {
                from: self.status,
                to,
            })
        }
    }
}

/// A request to set one status for many desks across a date range.
///
/// Never persisted itself; it expands into one booking per `(desk, day)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAvailabilityCommand {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub desk_ids: Vec<String>,
    pub status: BookingStatus,
    /// Required when `status` is booked or assigned, ignored otherwise.
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub person_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub title: Option<String>,
    /// Only allowed when `status` is booked.
    #[serde(default)]
    pub price: Option<f64>,
}

impl BulkAvailabilityCommand {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        desk_ids: Vec<String>,
        status: BookingStatus,
    ) -> Self {
        Self {
            start_date,
            end_date,
            desk_ids,
            status,
            person_name: None,
            title: None,
            price: None,
        }
    }

    pub fn with_person(mut self, person_name: impl Into<String>) -> Self {
        self.person_name = Some(person_name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}
