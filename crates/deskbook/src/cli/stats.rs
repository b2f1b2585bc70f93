//! Statistics CLI commands.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Statistics commands.
#[derive(Debug, Parser)]
pub struct StatsCommand {
    #[command(subcommand)]
    pub action: StatsAction,
}

/// Available statistics.
#[derive(Debug, Subcommand)]
pub enum StatsAction {
    /// Totals for one calendar month.
    Month {
        /// Year.
        year: i32,
        /// Month (1-12).
        month: u32,
    },
    /// Totals for a date range.
    Range {
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: NaiveDate,
    },
    /// Per-desk occupancy for a date range.
    Desks {
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: NaiveDate,
    },
}
