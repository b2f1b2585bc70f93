//! Occupancy and money aggregates computed from bookings and expenses.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking::{Booking, BookingStatus, Desk};
use crate::expense::Expense;
use crate::storage::DateRange;

/// Totals for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_desks: usize,
    pub days: u64,
    /// `total_desks * days`, the number of bookable slots.
    pub desk_days: u64,
    /// Booked plus assigned slots.
    pub occupied: u64,
    pub booked: u64,
    pub assigned: u64,
    pub unavailable: u64,
    /// Occupied slots over slots that were not blocked, in `0.0..=1.0`.
    pub occupancy_rate: f64,
    pub revenue: f64,
    pub expenses: f64,
    pub net: f64,
}

/// Occupancy of a single desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskStatistics {
    pub desk_id: String,
    pub label: String,
    pub occupied_days: u64,
    pub booked_days: u64,
    pub assigned_days: u64,
    pub revenue: f64,
}

/// Aggregates bookings and expenses that fall inside `range`.
///
/// Records outside the range are ignored, so callers may pass a superset.
pub fn compute_period_stats(
    range: DateRange,
    desks: &[Desk],
    bookings: &[Booking],
    expenses: &[Expense],
) -> PeriodStats {
    let days = range.num_days();
    let desk_days = desks.len() as u64 * days;

    let mut stats = PeriodStats {
        start: range.start,
        end: range.end,
        total_desks: desks.len(),
        days,
        desk_days,
        occupied: 0,
        booked: 0,
        assigned: 0,
        unavailable: 0,
        occupancy_rate: 0.0,
        revenue: 0.0,
        expenses: 0.0,
        net: 0.0,
    };

    for booking in bookings.iter().filter(|b| range.contains(b.date)) {
        match booking.status {
            BookingStatus::Booked => {
                stats.booked += 1;
                stats.revenue += booking.price.unwrap_or(0.0);
            }
            BookingStatus::Assigned => stats.assigned += 1,
            BookingStatus::Unavailable => stats.unavailable += 1,
            _ => {}
        }
    }
    stats.occupied = stats.booked + stats.assigned;

    stats.expenses = expenses
        .iter()
        .filter(|e| range.contains(e.date))
        .map(|e| e.amount)
        .sum();
    stats.net = stats.revenue - stats.expenses;

    let bookable = desk_days.saturating_sub(stats.unavailable);
    if bookable > 0 {
        stats.occupancy_rate = (stats.occupied as f64 / bookable as f64).min(1.0);
    }

    stats
}

/// Per-desk occupancy, in seeded desk order.
///
/// Bookings for desks that are not seeded are skipped.
pub fn compute_desk_statistics(desks: &[Desk], bookings: &[Booking]) -> Vec<DeskStatistics> {
    let mut by_desk: HashMap<&str, DeskStatistics> = desks
        .iter()
        .map(|desk| {
            (
                desk.id.as_str(),
                DeskStatistics {
                    desk_id: desk.id.clone(),
                    label: desk.label.clone(),
                    occupied_days: 0,
                    booked_days: 0,
                    assigned_days: 0,
                    revenue: 0.0,
                },
            )
        })
        .collect();

    for booking in bookings {
        let Some(entry) = by_desk.get_mut(booking.desk_id.as_str()) else {
            continue;
        };
        match booking.status {
            BookingStatus::Booked => {
                entry.booked_days += 1;
                entry.revenue += booking.price.unwrap_or(0.0);
            }
            BookingStatus::Assigned => entry.assigned_days += 1,
            _ => {}
        }
        entry.occupied_days = entry.booked_days + entry.assigned_days;
    }

    desks
        .iter()
        .filter_map(|desk| by_desk.remove(desk.id.as_str()))
        .collect()
}

/// Occupied bookings dated on or after `from`, ordered by date then desk.
pub fn select_upcoming(bookings: Vec<Booking>, from: NaiveDate, limit: usize) -> Vec<Booking> {
    let mut upcoming: Vec<Booking> = bookings
        .into_iter()
        .filter(|b| b.status.is_occupied() && b.date >= from)
        .collect();
    upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.desk_id.cmp(&b.desk_id)));
    upcoming.truncate(limit);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::seed_desks;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_stats_counts_and_money() {
        let desks = seed_desks();
        let march = DateRange::month(2024, 3).unwrap();
        let bookings = vec![
            Booking::booked("D1", date(2024, 3, 15), "Ana").with_price(25.0),
            Booking::booked("D2", date(2024, 3, 15), "Ben"),
            Booking::available("D3", date(2024, 3, 15))
                .assign("Cleo")
                .unwrap(),
            Booking::available("D4", date(2024, 3, 15)).block().unwrap(),
            Booking::booked("D1", date(2024, 4, 1), "Ana").with_price(99.0),
        ];
        let expenses = vec![
            Expense::new(date(2024, 3, 1), 10.0, "Paper"),
            Expense::new(date(2024, 2, 28), 500.0, "Outside"),
        ];

        let stats = compute_period_stats(march, &desks, &bookings, &expenses);

        assert_eq!(stats.total_desks, 10);
        assert_eq!(stats.days, 31);
        assert_eq!(stats.desk_days, 310);
        assert_eq!(stats.booked, 2);
        assert_eq!(stats.assigned, 1);
        assert_eq!(stats.occupied, 3);
        assert_eq!(stats.unavailable, 1);
        assert_eq!(stats.revenue, 25.0);
        assert_eq!(stats.expenses, 10.0);
        assert_eq!(stats.net, 15.0);
        assert!((stats.occupancy_rate - 3.0 / 309.0).abs() < 1e-9);
    }

    #[test]
    fn test_period_stats_without_desks() {
        let range = DateRange::day(date(2024, 3, 1));
        let stats = compute_period_stats(range, &[], &[], &[]);

        assert_eq!(stats.desk_days, 0);
        assert_eq!(stats.occupancy_rate, 0.0);
    }

    #[test]
    fn test_desk_statistics_in_seed_order() {
        let desks = seed_desks();
        let bookings = vec![
            Booking::booked("D2", date(2024, 3, 1), "Ana").with_price(20.0),
            Booking::booked("D2", date(2024, 3, 2), "Ana"),
            Booking::available("D1", date(2024, 3, 1))
                .assign("Ben")
                .unwrap(),
            Booking::booked("D99", date(2024, 3, 1), "Ghost"),
        ];

        let stats = compute_desk_statistics(&desks, &bookings);

        assert_eq!(stats.len(), 10);
        assert_eq!(stats[0].desk_id, "D1");
        assert_eq!(stats[0].assigned_days, 1);
        assert_eq!(stats[0].occupied_days, 1);
        assert_eq!(stats[1].booked_days, 2);
        assert_eq!(stats[1].revenue, 20.0);
        assert_eq!(stats[9].occupied_days, 0);
    }

    #[test]
    fn test_select_upcoming_orders_and_limits() {
        let from = date(2024, 3, 10);
        let bookings = vec![
            Booking::booked("D2", date(2024, 3, 12), "Ana"),
            Booking::booked("D1", date(2024, 3, 12), "Ben"),
            Booking::booked("D1", date(2024, 3, 9), "Past"),
            Booking::available("D3", date(2024, 3, 11)),
            Booking::booked("D3", date(2024, 3, 10), "Cleo"),
        ];

        let upcoming = select_upcoming(bookings, from, 2);

        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].desk_id, "D3");
        assert_eq!(upcoming[1].desk_id, "D1");
        assert_eq!(upcoming[1].date, date(2024, 3, 12));
    }
}
