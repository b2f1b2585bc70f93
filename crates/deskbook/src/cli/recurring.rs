//! Recurring-expense CLI commands.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use deskbook_core::expense::ExpenseCategory;

/// Recurring-expense rule commands.
#[derive(Debug, Parser)]
pub struct RecurringCommand {
    #[command(subcommand)]
    pub action: RecurringAction,
}

/// Available recurring-expense actions.
#[derive(Debug, Subcommand)]
pub enum RecurringAction {
    /// List every rule.
    List,
    /// Create a rule.
    Add {
        /// What it is for.
        description: String,
        /// Amount per month.
        amount: f64,
        /// Day of month (1-31), clamped to short months.
        day: u32,
        /// Category.
        #[arg(long, default_value = "other")]
        category: ExpenseCategory,
        /// First day the rule applies.
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day the rule applies.
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Create the rule paused.
        #[arg(long)]
        inactive: bool,
    },
    /// Pause or resume a rule.
    SetActive {
        /// Rule ID.
        id: String,
        /// New state.
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Delete a rule. Expenses it already generated are kept.
    Delete {
        /// Rule ID.
        id: String,
    },
    /// Materialize expenses for one month.
    Generate {
        /// Year.
        year: i32,
        /// Month (1-12).
        month: u32,
    },
}
