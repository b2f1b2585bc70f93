use super::error::ExpenseError;
use super::types::{Expense, RecurringExpense};

/// Validates an expense before persistence.
pub fn validate_expense(expense: &Expense) -> Result<(), ExpenseError> {
    if expense.description.trim().is_empty() {
        return Err(ExpenseError::EmptyDescription);
    }
    validate_amount(expense.amount)
}

/// Validates a recurring rule before persistence.
pub fn validate_recurring_expense(rule: &RecurringExpense) -> Result<(), ExpenseError> {
    if rule.description.trim().is_empty() {
        return Err(ExpenseError::EmptyDescription);
    }
    validate_amount(rule.amount)?;
    if !(1..=31).contains(&rule.day_of_month) {
        return Err(ExpenseError::InvalidDayOfMonth(rule.day_of_month));
    }
    if let (Some(start), Some(end)) = (rule.start_date, rule.end_date) {
        if end < start {
            return Err(ExpenseError::InvalidWindow);
        }
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<(), ExpenseError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ExpenseError::InvalidAmount(amount.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_validate_expense() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert!(validate_expense(&Expense::new(date, 10.0, "Paper")).is_ok());
        assert_eq!(
            validate_expense(&Expense::new(date, 10.0, " ")),
            Err(ExpenseError::EmptyDescription)
        );
        assert!(matches!(
            validate_expense(&Expense::new(date, f64::NAN, "Paper")),
            Err(ExpenseError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_recurring_day_bounds() {
        assert!(validate_recurring_expense(&RecurringExpense::new("Rent", 900.0, 31)).is_ok());
        assert_eq!(
            validate_recurring_expense(&RecurringExpense::new("Rent", 900.0, 0)),
            Err(ExpenseError::InvalidDayOfMonth(0))
        );
        assert_eq!(
            validate_recurring_expense(&RecurringExpense::new("Rent", 900.0, 32)),
            Err(ExpenseError::InvalidDayOfMonth(32))
        );
    }

    #[test]
    fn test_validate_recurring_window() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let rule = RecurringExpense::new("Rent", 900.0, 1).with_window(Some(start), Some(end));

        assert_eq!(
            validate_recurring_expense(&rule),
            Err(ExpenseError::InvalidWindow)
        );
    }
}
