//! Booking CLI commands.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use deskbook_core::booking::BookingStatus;

/// Booking management commands.
#[derive(Debug, Parser)]
pub struct BookingsCommand {
    #[command(subcommand)]
    pub action: BookingsAction,
}

/// Available booking actions.
#[derive(Debug, Subcommand)]
pub enum BookingsAction {
    /// List bookings in a date range.
    List {
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: NaiveDate,
        /// Only show this desk.
        #[arg(long)]
        desk: Option<String>,
    },
    /// Book an available desk for a person.
    Book {
        /// Desk ID.
        desk: String,
        /// Day (YYYY-MM-DD).
        date: NaiveDate,
        /// Person occupying the desk.
        #[arg(long)]
        person: String,
        /// Optional title.
        #[arg(long)]
        title: Option<String>,
        /// Optional price.
        #[arg(long)]
        price: Option<f64>,
    },
    /// Assign an available desk to a person.
    Assign {
        /// Desk ID.
        desk: String,
        /// Day (YYYY-MM-DD).
        date: NaiveDate,
        /// Person occupying the desk.
        #[arg(long)]
        person: String,
        /// Optional title.
        #[arg(long)]
        title: Option<String>,
    },
    /// Free a booked or assigned desk.
    Release {
        /// Desk ID.
        desk: String,
        /// Day (YYYY-MM-DD).
        date: NaiveDate,
    },
    /// Block an available desk.
    Block {
        /// Desk ID.
        desk: String,
        /// Day (YYYY-MM-DD).
        date: NaiveDate,
    },
    /// Reopen a blocked desk.
    Unblock {
        /// Desk ID.
        desk: String,
        /// Day (YYYY-MM-DD).
        date: NaiveDate,
    },
    /// Delete a booking by ID.
    Delete {
        /// Booking ID.
        id: String,
    },
    /// Overwrite a status for many desks across a date range.
    Bulk {
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: NaiveDate,
        /// Desk IDs, comma separated or repeated.
        #[arg(long = "desk", value_delimiter = ',', required = true)]
        desks: Vec<String>,
        /// Status to apply.
        #[arg(long)]
        status: BookingStatus,
        /// Person, required for booked and assigned.
        #[arg(long)]
        person: Option<String>,
        /// Optional title.
        #[arg(long)]
        title: Option<String>,
        /// Optional price, booked only.
        #[arg(long)]
        price: Option<f64>,
    },
    /// Occupied bookings from a day on, soonest first.
    Upcoming {
        /// First day (defaults to today).
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Maximum number of bookings.
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}
