//! Waiting-list CLI commands.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Waiting-list commands.
#[derive(Debug, Parser)]
pub struct WaitlistCommand {
    #[command(subcommand)]
    pub action: WaitlistAction,
}

/// Available waiting-list actions.
#[derive(Debug, Subcommand)]
pub enum WaitlistAction {
    /// List entries, newest first.
    List,
    /// Add a person.
    Add {
        /// Name.
        name: String,
        /// Contact email.
        #[arg(long)]
        email: Option<String>,
        /// Contact phone.
        #[arg(long)]
        phone: Option<String>,
        /// Day they would like to start.
        #[arg(long)]
        desired_start: Option<NaiveDate>,
        /// Free-form notes.
        #[arg(long)]
        notes: Option<String>,
    },
    /// Update an entry.
    Update {
        /// Entry ID.
        id: String,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New email.
        #[arg(long)]
        email: Option<String>,
        /// New phone.
        #[arg(long)]
        phone: Option<String>,
        /// New desired start.
        #[arg(long)]
        desired_start: Option<NaiveDate>,
        /// New notes.
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove an entry by ID.
    Remove {
        /// Entry ID.
        id: String,
    },
    /// Remove every entry.
    Clear,
}
