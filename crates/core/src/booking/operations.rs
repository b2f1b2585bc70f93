use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::storage::{DateRange, ValidationError};

use super::error::BookingError;
use super::types::{Booking, BookingStatus, BulkAvailabilityCommand, Desk, SchemaVersion};

/// Validates the booking invariant before persistence.
///
/// booked/assigned ⇔ person present; any other status carries no person,
/// title or price; only booked may carry a price.
pub fn validate_booking(booking: &Booking, version: SchemaVersion) -> Result<(), BookingError> {
    validate_status(booking.status, version)?;

    if booking.status.is_occupied() {
        if !has_text(&booking.person_name) {
            return Err(BookingError::MissingPersonName {
                status: booking.status,
            });
        }
    } else if booking.person_name.is_some() || booking.title.is_some() || booking.price.is_some()
    {
        return Err(BookingError::UnexpectedPersonFields {
            status: booking.status,
        });
    }

    validate_price(booking.status, booking.price)
}

/// Checks that a single-booking write follows the status state machine.
///
/// Allowed: staying in the same state, leaving `available` for any other
/// state, and returning to `available` from any other state.
pub fn validate_transition(from: BookingStatus, to: BookingStatus) -> Result<(), BookingError> {
    let allowed = from == to || from == BookingStatus::Available || to == BookingStatus::Available;
    if allowed {
        Ok(())
    } else {
        Err(BookingError::IllegalTransition { from, to })
    }
}

/// Full check for a single-booking save against what is currently stored.
///
/// A missing booking counts as `available`.
pub fn validate_booking_save(
    existing: Option<&Booking>,
    next: &Booking,
    desks: &[Desk],
    version: SchemaVersion,
) -> Result<(), BookingError> {
    validate_desk(&next.desk_id, desks)?;
    validate_booking(next, version)?;
    let from = existing
        .map(|b| b.status)
        .unwrap_or(BookingStatus::Available);
    validate_transition(from, next.status)
}

/// Rejects a save whose id is already held by a booking in another slot.
///
/// `holder` is whatever is currently stored under `next.id`. Writing through
/// it would replace that booking without a transition.
pub fn validate_booking_id(holder: Option<&Booking>, next: &Booking) -> Result<(), BookingError> {
    match holder {
        Some(held) if held.key() != next.key() => Err(BookingError::IdTaken {
            id: next.id.clone(),
            desk_id: held.desk_id.clone(),
            date: held.date,
        }),
        _ => Ok(()),
    }
}

/// Validates a bulk command and returns its date range.
pub fn validate_bulk_command(
    command: &BulkAvailabilityCommand,
    desks: &[Desk],
    version: SchemaVersion,
) -> Result<DateRange, ValidationError> {
    let range = DateRange::new(command.start_date, command.end_date)?;

    if command.desk_ids.is_empty() {
        return Err(BookingError::EmptyDeskSelection.into());
    }
    for desk_id in &command.desk_ids {
        validate_desk(desk_id, desks)?;
    }

    validate_status(command.status, version)?;
    if command.status.is_occupied() {
        if !has_text(&command.person_name) {
            return Err(BookingError::MissingPersonName {
                status: command.status,
            }
            .into());
        }
        validate_price(command.status, command.price)?;
    }

    Ok(range)
}

/// Expands a validated bulk command into one booking per `(desk, day)`.
///
/// Existing bookings for a slot keep their id and creation time; everything
/// else is overwritten. Person fields are only carried for occupied statuses.
pub fn expand_bulk_command(
    command: &BulkAvailabilityCommand,
    range: DateRange,
    existing: &[Booking],
    now: DateTime<Utc>,
) -> Vec<Booking> {
    let by_key: HashMap<(&str, NaiveDate), &Booking> =
        existing.iter().map(|b| (b.key(), b)).collect();

    let mut desk_ids: Vec<&str> = Vec::with_capacity(command.desk_ids.len());
    for desk_id in &command.desk_ids {
        if !desk_ids.contains(&desk_id.as_str()) {
            desk_ids.push(desk_id.as_str());
        }
    }

    let occupied = command.status.is_occupied();
    let mut bookings = Vec::with_capacity(desk_ids.len() * range.num_days() as usize);
    for desk_id in desk_ids {
        for date in range.days() {
            let previous = by_key.get(&(desk_id, date));
            bookings.push(Booking {
                id: previous
                    .map(|b| b.id.clone())
                    .unwrap_or_else(|| Booking::natural_id(desk_id, date)),
                desk_id: desk_id.to_string(),
                date,
                status: command.status,
                person_name: command.person_name.clone().filter(|_| occupied),
                title: command.title.clone().filter(|_| occupied),
                price: command.price.filter(|_| command.status.allows_price()),
                created_at: previous.map(|b| b.created_at).unwrap_or(now),
            });
        }
    }
    bookings
}

/// Sorts bookings by date, then desk id.
pub fn sort_bookings(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.desk_id.cmp(&b.desk_id)));
}

fn validate_desk(desk_id: &str, desks: &[Desk]) -> Result<(), BookingError> {
    if desks.iter().any(|d| d.id == desk_id) {
        Ok(())
    } else {
        Err(BookingError::UnknownDesk(desk_id.to_string()))
    }
}

fn validate_status(status: BookingStatus, version: SchemaVersion) -> Result<(), BookingError> {
    if version.supports(status) {
        Ok(())
    } else {
        Err(BookingError::UnsupportedStatus { status, version })
    }
}

fn validate_price(status: BookingStatus, price: Option<f64>) -> Result<(), BookingError> {
    let Some(price) = price else {
        return Ok(());
    };
    if !status.allows_price() {
        return Err(BookingError::PriceNotAllowed { status });
    }
    if !price.is_finite() || price < 0.0 {
        return Err(BookingError::InvalidPrice(price.to_string()));
    }
    Ok(())
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::seed_desks;
    use crate::storage::DateRangeError;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn test_booked_without_person_is_rejected() {
        let mut booking = Booking::available("D1", date(1));
        booking.status = BookingStatus::Booked;

        assert_eq!(
            validate_booking(&booking, SchemaVersion::V2),
            Err(BookingError::MissingPersonName {
                status: BookingStatus::Booked
            })
        );
    }

    #[test]
    fn test_id_held_by_another_slot_is_rejected() {
        let held = Booking::booked("D1", date(1), "Ana");
        let next = Booking::booked("D2", date(2), "Bea").with_id(held.id.clone());

        assert_eq!(
            validate_booking_id(Some(&held), &next),
            Err(BookingError::IdTaken {
                id: held.id.clone(),
                desk_id: "D1".to_string(),
                date: date(1),
            })
        );
        assert!(validate_booking_id(Some(&held), &held.clone().release().unwrap()).is_ok());
        assert!(validate_booking_id(None, &next).is_ok());
    }

    #[test]
    fn test_blank_person_is_rejected() {
        let booking = Booking::booked("D1", date(1), "   ");

        assert!(validate_booking(&booking, SchemaVersion::V2).is_err());
    }

    #[test]
    fn test_available_with_person_is_rejected() {
        let mut booking = Booking::available("D1", date(1));
        booking.person_name = Some("Ana".to_string());

        assert_eq!(
            validate_booking(&booking, SchemaVersion::V2),
            Err(BookingError::UnexpectedPersonFields {
                status: BookingStatus::Available
            })
        );
    }

    #[test]
    fn test_available_with_price_is_rejected() {
        let booking = Booking::available("D1", date(1)).with_price(5.0);

        assert!(validate_booking(&booking, SchemaVersion::V2).is_err());
    }

    #[test]
    fn test_assigned_with_price_is_rejected() {
        let mut booking = Booking::booked("D1", date(1), "Ana").with_price(5.0);
        booking.status = BookingStatus::Assigned;

        assert_eq!(
            validate_booking(&booking, SchemaVersion::V2),
            Err(BookingError::PriceNotAllowed {
                status: BookingStatus::Assigned
            })
        );
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let booking = Booking::booked("D1", date(1), "Ana").with_price(-1.0);

        assert!(matches!(
            validate_booking(&booking, SchemaVersion::V2),
            Err(BookingError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_unavailable_requires_v2() {
        let booking = Booking::available("D1", date(1)).block().unwrap();

        assert!(validate_booking(&booking, SchemaVersion::V2).is_ok());
        assert_eq!(
            validate_booking(&booking, SchemaVersion::V1),
            Err(BookingError::UnsupportedStatus {
                status: BookingStatus::Unavailable,
                version: SchemaVersion::V1
            })
        );
    }

    #[test]
    fn test_transitions() {
        use BookingStatus::*;

        assert!(validate_transition(Available, Booked).is_ok());
        assert!(validate_transition(Available, Assigned).is_ok());
        assert!(validate_transition(Booked, Available).is_ok());
        assert!(validate_transition(Assigned, Available).is_ok());
        assert!(validate_transition(Booked, Booked).is_ok());
        assert!(validate_transition(Booked, Assigned).is_err());
        assert!(validate_transition(Assigned, Booked).is_err());
        assert!(validate_transition(Unavailable, Booked).is_err());
    }

    #[test]
    fn test_save_checks_existing_status() {
        let desks = seed_desks();
        let existing = Booking::booked("D1", date(1), "Ana");
        let next = Booking::available("D1", date(1)).assign("Bea").unwrap();

        assert!(validate_booking_save(None, &next, &desks, SchemaVersion::V2).is_ok());
        assert!(
            validate_booking_save(Some(&existing), &next, &desks, SchemaVersion::V2).is_err()
        );
    }

    #[test]
    fn test_save_rejects_unknown_desk() {
        let desks = seed_desks();
        let next = Booking::available("X9", date(1));

        assert_eq!(
            validate_booking_save(None, &next, &desks, SchemaVersion::V2),
            Err(BookingError::UnknownDesk("X9".to_string()))
        );
    }

    #[test]
    fn test_bulk_validation() {
        let desks = seed_desks();
        let ids = vec!["D1".to_string()];

        let inverted =
            BulkAvailabilityCommand::new(date(3), date(1), ids.clone(), BookingStatus::Available);
        assert_eq!(
            validate_bulk_command(&inverted, &desks, SchemaVersion::V2),
            Err(ValidationError::DateRange(DateRangeError::InvalidRange))
        );

        let empty =
            BulkAvailabilityCommand::new(date(1), date(3), vec![], BookingStatus::Available);
        assert_eq!(
            validate_bulk_command(&empty, &desks, SchemaVersion::V2),
            Err(ValidationError::Booking(BookingError::EmptyDeskSelection))
        );

        let bare_booked =
            BulkAvailabilityCommand::new(date(1), date(3), ids.clone(), BookingStatus::Booked);
        assert!(validate_bulk_command(&bare_booked, &desks, SchemaVersion::V2).is_err());

        let booked = bare_booked.with_person("Ana");
        let range = validate_bulk_command(&booked, &desks, SchemaVersion::V2).unwrap();
        assert_eq!(range.num_days(), 3);
    }

    #[test]
    fn test_expand_covers_cross_product() {
        let command = BulkAvailabilityCommand::new(
            date(1),
            date(3),
            vec!["D1".to_string(), "D2".to_string()],
            BookingStatus::Available,
        );
        let range = DateRange::new(date(1), date(3)).unwrap();

        let bookings = expand_bulk_command(&command, range, &[], Utc::now());

        assert_eq!(bookings.len(), 6);
        assert!(bookings
            .iter()
            .all(|b| b.status == BookingStatus::Available && b.person_name.is_none()));
    }

    #[test]
    fn test_expand_overwrites_existing_and_keeps_id() {
        let existing = Booking::booked("D1", date(2), "Ana")
            .with_id("legacy-id")
            .with_title("Sprint");
        let command = BulkAvailabilityCommand::new(
            date(1),
            date(3),
            vec!["D1".to_string(), "D1".to_string()],
            BookingStatus::Available,
        );
        let range = DateRange::new(date(1), date(3)).unwrap();

        let bookings = expand_bulk_command(&command, range, &[existing], Utc::now());

        assert_eq!(bookings.len(), 3);
        let overwritten = bookings.iter().find(|b| b.date == date(2)).unwrap();
        assert_eq!(overwritten.id, "legacy-id");
        assert_eq!(overwritten.person_name, None);
        assert_eq!(overwritten.title, None);
    }

    #[test]
    fn test_expand_occupied_carries_person() {
        let command = BulkAvailabilityCommand::new(
            date(1),
            date(1),
            vec!["D3".to_string()],
            BookingStatus::Assigned,
        )
        .with_person("Team Blue")
        .with_price(12.0);
        let range = DateRange::day(date(1));

        let bookings = expand_bulk_command(&command, range, &[], Utc::now());

        assert_eq!(bookings[0].person_name.as_deref(), Some("Team Blue"));
        assert_eq!(bookings[0].price, None);
    }
}
