//! Pretty output formatting.

use deskbook_core::booking::{Booking, Desk};
use deskbook_core::expense::{Expense, RecurringExpense};
use deskbook_core::stats::{DeskStatistics, PeriodStats};
use deskbook_core::waitlist::WaitingListEntry;

fn format_list<T>(title: &str, empty: &str, items: &[T], format: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    let mut output = format!("{title} ({})\n", items.len());
    output.push_str(&"-".repeat(40));
    for item in items {
        output.push_str(&format!("\n{}", format(item)));
        output.push('\n');
    }
    output
}

/// Format a desk for display.
pub fn format_desk(desk: &Desk) -> String {
    format!("{} [{}]\n  Room: {}", desk.label, desk.id, desk.room)
}

/// Format desks for display.
pub fn format_desks(desks: &[Desk]) -> String {
    format_list("DESKS", "No desks configured.", desks, format_desk)
}

/// Format a booking for display.
pub fn format_booking(booking: &Booking) -> String {
    let mut output = format!(
        "{} {} [{}]\n  ID: {}",
        booking.date, booking.desk_id, booking.status, booking.id
    );
    if let Some(person) = &booking.person_name {
        output.push_str(&format!("\n  Person: {person}"));
    }
    if let Some(title) = &booking.title {
        output.push_str(&format!("\n  Title: {title}"));
    }
    if let Some(price) = booking.price {
        output.push_str(&format!("\n  Price: {price:.2}"));
    }
    output
}

/// Format bookings for display.
pub fn format_bookings(bookings: &[Booking]) -> String {
    format_list("BOOKINGS", "No bookings found.", bookings, format_booking)
}

/// Format an expense for display.
pub fn format_expense(expense: &Expense) -> String {
    let mut output = format!(
        "{} {:.2} {} [{}]\n  ID: {}",
        expense.date, expense.amount, expense.description, expense.category, expense.id
    );
    if let Some(rule) = &expense.recurring_expense_id {
        output.push_str(&format!("\n  Generated from: {rule}"));
    }
    output
}

/// Format expenses for display.
pub fn format_expenses(expenses: &[Expense]) -> String {
    format_list("EXPENSES", "No expenses found.", expenses, format_expense)
}

/// Format a recurring-expense rule for display.
pub fn format_rule(rule: &RecurringExpense) -> String {
    let state = if rule.active { "active" } else { "paused" };
    let mut output = format!(
        "{} {:.2} on day {} [{}, {}]\n  ID: {}",
        rule.description, rule.amount, rule.day_of_month, rule.category, state, rule.id
    );
    if let Some(start) = rule.start_date {
        output.push_str(&format!("\n  From: {start}"));
    }
    if let Some(end) = rule.end_date {
        output.push_str(&format!("\n  Until: {end}"));
    }
    output
}

/// Format recurring-expense rules for display.
pub fn format_rules(rules: &[RecurringExpense]) -> String {
    format_list("RECURRING EXPENSES", "No recurring expenses found.", rules, format_rule)
}

/// Format period totals for display.
pub fn format_period_stats(stats: &PeriodStats) -> String {
    format!(
        "{} .. {} ({} days, {} desks)\n  Occupied: {} of {} ({:.1}%)\n  Booked: {}\n  Assigned: {}\n  Unavailable: {}\n  Revenue: {:.2}\n  Expenses: {:.2}\n  Net: {:.2}",
        stats.start,
        stats.end,
        stats.days,
        stats.total_desks,
        stats.occupied,
        stats.desk_days,
        stats.occupancy_rate * 100.0,
        stats.booked,
        stats.assigned,
        stats.unavailable,
        stats.revenue,
        stats.expenses,
        stats.net,
    )
}

/// Format per-desk statistics for display.
pub fn format_desk_statistics(stats: &[DeskStatistics]) -> String {
    format_list("DESKS", "No desks configured.", stats, |s| {
        format!(
            "{} [{}]\n  Occupied: {} (booked {}, assigned {})\n  Revenue: {:.2}",
            s.label, s.desk_id, s.occupied_days, s.booked_days, s.assigned_days, s.revenue
        )
    })
}

/// Format a waiting-list entry for display.
pub fn format_entry(entry: &WaitingListEntry) -> String {
    let mut output = format!(
        "{}\n  ID: {}\n  Added: {}",
        entry.name,
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(email) = &entry.email {
        output.push_str(&format!("\n  Email: {email}"));
    }
    if let Some(phone) = &entry.phone {
        output.push_str(&format!("\n  Phone: {phone}"));
    }
    if let Some(start) = entry.desired_start {
        output.push_str(&format!("\n  Desired start: {start}"));
    }
    if let Some(notes) = &entry.notes {
        output.push_str(&format!("\n  Notes: {notes}"));
    }
    output
}

/// Format waiting-list entries for display.
pub fn format_entries(entries: &[WaitingListEntry]) -> String {
    format_list("WAITING LIST", "Nobody is waiting.", entries, format_entry)
}
