//! Expense CLI commands.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use deskbook_core::expense::ExpenseCategory;

/// Expense management commands.
#[derive(Debug, Parser)]
pub struct ExpensesCommand {
    #[command(subcommand)]
    pub action: ExpensesAction,
}

/// Available expense actions.
#[derive(Debug, Subcommand)]
pub enum ExpensesAction {
    /// List expenses in a date range.
    List {
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: NaiveDate,
    },
    /// Record an expense.
    Add {
        /// Day (YYYY-MM-DD).
        date: NaiveDate,
        /// Amount.
        amount: f64,
        /// What it was for.
        description: String,
        /// Category.
        #[arg(long, default_value = "other")]
        category: ExpenseCategory,
    },
    /// Delete an expense by ID.
    Delete {
        /// Expense ID.
        id: String,
    },
}
