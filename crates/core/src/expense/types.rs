use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bookkeeping category of an expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Cleaning,
    Supplies,
    Maintenance,
    Internet,
    #[default]
    Other,
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Cleaning => "cleaning",
            ExpenseCategory::Supplies => "supplies",
            ExpenseCategory::Maintenance => "maintenance",
            ExpenseCategory::Internet => "internet",
            ExpenseCategory::Other => "other",
        };
        f.write_str(name)
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rent" => Ok(ExpenseCategory::Rent),
            "utilities" => Ok(ExpenseCategory::Utilities),
            "cleaning" => Ok(ExpenseCategory::Cleaning),
            "supplies" => Ok(ExpenseCategory::Supplies),
            "maintenance" => Ok(ExpenseCategory::Maintenance),
            "internet" => Ok(ExpenseCategory::Internet),
            "other" => Ok(ExpenseCategory::Other),
            other => Err(format!("unknown expense category: {other}")),
        }
    }
}

/// A dated expense, entered directly or generated from a recurring rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub description: String,
    /// Set on generated expenses. A plain id, never a live reference.
    #[serde(default)]
    pub recurring_expense_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Creates a one-off expense with a fresh id.
    pub fn new(date: NaiveDate, amount: f64, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            amount,
            category: ExpenseCategory::default(),
            description: description.into(),
            recurring_expense_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    /// Sets a specific ID (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns true if this expense came out of a generator run.
    pub fn is_generated(&self) -> bool {
        self.recurring_expense_id.is_some()
    }
}

/// A rule that yields one expense per month on a fixed day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    /// 1..=31, clamped to the month's last day when generating.
    pub day_of_month: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    /// First day the rule applies, if bounded.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day the rule applies, if bounded.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl RecurringExpense {
    /// Creates an active, unbounded rule with a fresh id.
    pub fn new(description: impl Into<String>, amount: f64, day_of_month: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            amount,
            category: ExpenseCategory::default(),
            day_of_month,
            active: true,
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    /// Limits the rule to a window of days.
    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets a specific ID (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}
