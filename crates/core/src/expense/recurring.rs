//! Expansion of recurring-expense rules into dated expenses.
//!
//! Generation is a pure function of the current rules and the target month.
//! The id of each generated expense is derived from the rule and the month,
//! so persisting the output with upsert semantics is idempotent.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::storage::{DateRange, DateRangeError};

use super::types::{Expense, RecurringExpense};

/// Deterministic id of the expense a rule yields for a month.
///
/// # Example
///
/// ```
/// use deskbook_core::expense::generated_expense_id;
///
/// assert_eq!(generated_expense_id("rent", 2024, 3), "recurring:rent:2024-03");
/// ```
pub fn generated_expense_id(rule_id: &str, year: i32, month: u32) -> String {
    format!("recurring:{rule_id}:{year:04}-{month:02}")
}

/// Places `day_of_month` inside the month, clamping to its last day.
pub fn clamp_day(month: DateRange, day_of_month: u32) -> NaiveDate {
    let day = day_of_month.clamp(1, month.end.day());
    month.start.with_day(day).unwrap_or(month.end)
}

/// Returns true if the rule should yield an expense for the month.
pub fn is_active_in(rule: &RecurringExpense, month: DateRange) -> bool {
    if !rule.active {
        return false;
    }
    if rule.start_date.is_some_and(|start| start > month.end) {
        return false;
    }
    if rule.end_date.is_some_and(|end| end < month.start) {
        return false;
    }
    true
}

/// Expands every active rule into one expense for `year`/`month`.
///
/// The output is sorted by id so repeated runs are byte-for-byte comparable.
pub fn generate_for_month(
    rules: &[RecurringExpense],
    year: i32,
    month: u32,
    now: DateTime<Utc>,
) -> Result<Vec<Expense>, DateRangeError> {
    let period = DateRange::month(year, month)?;

    let mut generated: Vec<Expense> = rules
        .iter()
        .filter(|rule| is_active_in(rule, period))
        .map(|rule| Expense {
            id: generated_expense_id(&rule.id, year, month),
            date: clamp_day(period, rule.day_of_month),
            amount: rule.amount,
            category: rule.category,
            description: rule.description.clone(),
            recurring_expense_id: Some(rule.id.clone()),
            created_at: now,
        })
        .collect();

    generated.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(generated)
}

/// Generated expenses for `year`/`month` that a fresh run no longer yields.
///
/// Only records whose id is the derived id of their own rule count, so a
/// hand-entered expense that merely points at a rule is left alone.
pub fn stale_generated_ids(
    existing: &[Expense],
    generated: &[Expense],
    year: i32,
    month: u32,
) -> Vec<String> {
    existing
        .iter()
        .filter(|e| {
            e.recurring_expense_id
                .as_deref()
                .is_some_and(|rule_id| e.id == generated_expense_id(rule_id, year, month))
        })
        .filter(|e| !generated.iter().any(|g| g.id == e.id))
        .map(|e| e.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::ExpenseCategory;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule(id: &str, day: u32) -> RecurringExpense {
        RecurringExpense::new(format!("Rule {id}"), 100.0, day).with_id(id)
    }

    #[test]
    fn test_clamp_day_to_short_months() {
        let feb_leap = DateRange::month(2024, 2).unwrap();
        let feb = DateRange::month(2023, 2).unwrap();
        let april = DateRange::month(2024, 4).unwrap();

        assert_eq!(clamp_day(feb_leap, 31), date(2024, 2, 29));
        assert_eq!(clamp_day(feb, 30), date(2023, 2, 28));
        assert_eq!(clamp_day(april, 31), date(2024, 4, 30));
        assert_eq!(clamp_day(april, 15), date(2024, 4, 15));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let rules = vec![
            rule("rent", 1).with_category(ExpenseCategory::Rent),
            rule("net", 20),
        ];
        let now = Utc::now();

        let first = generate_for_month(&rules, 2024, 3, now).unwrap();
        let second = generate_for_month(&rules, 2024, 3, now).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, "recurring:net:2024-03");
        assert_eq!(first[1].id, "recurring:rent:2024-03");
        assert_eq!(first[1].category, ExpenseCategory::Rent);
        assert_eq!(first[1].recurring_expense_id.as_deref(), Some("rent"));
    }

    #[test]
    fn test_generate_skips_inactive_and_out_of_window_rules() {
        let rules = vec![
            rule("paused", 1).with_active(false),
            rule("future", 1).with_window(Some(date(2024, 4, 1)), None),
            rule("ended", 1).with_window(None, Some(date(2024, 2, 29))),
            rule("midmonth", 1).with_window(Some(date(2024, 3, 20)), None),
        ];

        let generated = generate_for_month(&rules, 2024, 3, Utc::now()).unwrap();

        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].id, "recurring:midmonth:2024-03");
    }

    #[test]
    fn test_stale_ids_cover_only_dropped_rules() {
        let now = Utc::now();
        let before = generate_for_month(&[rule("rent", 1), rule("net", 5)], 2024, 3, now).unwrap();
        let after = generate_for_month(&[rule("rent", 1)], 2024, 3, now).unwrap();

        let mut manual = Expense::new(date(2024, 3, 9), 12.0, "Extra rent fee").with_id("fee");
        manual.recurring_expense_id = Some("net".to_string());
        let mut existing = before.clone();
        existing.push(manual);

        assert_eq!(
            stale_generated_ids(&existing, &after, 2024, 3),
            vec!["recurring:net:2024-03".to_string()]
        );
        assert!(stale_generated_ids(&existing, &before, 2024, 3).is_empty());
    }

    #[test]
    fn test_generate_without_rules_is_empty() {
        let generated = generate_for_month(&[], 2024, 3, Utc::now()).unwrap();
        assert!(generated.is_empty());
    }

    #[test]
    fn test_generate_rejects_invalid_month() {
        assert_eq!(
            generate_for_month(&[rule("rent", 1)], 2024, 13, Utc::now()),
            Err(DateRangeError::InvalidMonth {
                year: 2024,
                month: 13
            })
        );
    }
}
