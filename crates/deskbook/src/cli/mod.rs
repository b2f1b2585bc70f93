//! CLI command definitions.

pub mod bookings;
pub mod expenses;
pub mod recurring;
pub mod stats;
pub mod waitlist;

use clap::{Parser, Subcommand, ValueEnum};

/// Operator CLI for desk reservations and expenses.
#[derive(Debug, Parser)]
#[command(name = "deskbook")]
#[command(version, about = "Manage coworking desk reservations and expenses", long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, default_value = "pretty", env = "DESKBOOK_FORMAT")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the seeded desks.
    Desks,
    /// Desk bookings.
    Bookings(bookings::BookingsCommand),
    /// One-off and generated expenses.
    Expenses(expenses::ExpensesCommand),
    /// Recurring-expense rules.
    Recurring(recurring::RecurringCommand),
    /// Occupancy and money statistics.
    Stats(stats::StatsCommand),
    /// People waiting for a desk.
    Waitlist(waitlist::WaitlistCommand),
}
