use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use log::debug;
use rust_decimal::Decimal;

use super::budget_model::{BudgetSummary, CategoryTotal, Expense, Income};
use crate::constants::{DISPLAY_DECIMAL_PRECISION, UNKNOWN_GROUP};

/// Summarizes the entries dated in `year`. The last-entry dates look at
/// the whole tables.
pub fn summarize_budget(expenses: &[Expense], income: &[Income], year: i32) -> BudgetSummary {
    let expenses_in_year: Vec<&Expense> = expenses.iter().filter(|e| e.date.year() == year).collect();
    let income_in_year: Vec<&Income> = income.iter().filter(|i| i.date.year() == year).collect();

    let total_expenses: Decimal = expenses_in_year.iter().map(|e| e.amount).sum();
    let total_income: Decimal = income_in_year.iter().map(|i| i.amount).sum();
    let net_savings = total_income - total_expenses;

    let savings_rate = if total_income.is_zero() {
        None
    } else {
        Some((net_savings / total_income * Decimal::ONE_HUNDRED).round_dp(DISPLAY_DECIMAL_PRECISION))
    };

    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    for expense in &expenses_in_year {
        let category = expense
            .expense_category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_GROUP);
        *by_category.entry(category.to_string()).or_default() += expense.amount;
    }
    let mut expenses_by_category: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect();
    expenses_by_category.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    debug!(
        "Budget {}: {} expenses, {} income entries",
        year,
        expenses_in_year.len(),
        income_in_year.len()
    );

    BudgetSummary {
        year,
        total_income,
        total_expenses,
        net_savings,
        average_monthly_income: average_monthly(income_in_year.iter().map(|i| (i.date, i.amount))),
        average_monthly_expenses: average_monthly(
            expenses_in_year.iter().map(|e| (e.date, e.amount)),
        ),
        savings_rate,
        expenses_by_category,
        last_expense_date: expenses.iter().map(|e| e.date).max(),
        last_income_date: income.iter().map(|i| i.date).max(),
    }
}

fn average_monthly(entries: impl Iterator<Item = (NaiveDate, Decimal)>) -> Option<Decimal> {
    let mut monthly: BTreeMap<u32, Decimal> = BTreeMap::new();
    for (date, amount) in entries {
        *monthly.entry(date.month()).or_default() += amount;
    }
    if monthly.is_empty() {
        return None;
    }
    let total: Decimal = monthly.values().copied().sum();
    Some((total / Decimal::from(monthly.len())).round_dp(DISPLAY_DECIMAL_PRECISION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(d: NaiveDate, amount: Decimal, category: Option<&str>) -> Expense {
        Expense {
            amount,
            date: d,
            expense_category: category.map(str::to_string),
            description: None,
        }
    }

    fn income(d: NaiveDate, amount: Decimal) -> Income {
        Income {
            source: Some("Salary".to_string()),
            amount,
            date: d,
        }
    }

    #[test]
    fn test_yearly_summary() {
        let expenses = vec![
            expense(date(2024, 1, 3), dec!(1200), Some("Rent")),
            expense(date(2024, 1, 9), dec!(150.50), Some("Groceries")),
            expense(date(2024, 3, 3), dec!(1200), Some("Rent")),
            expense(date(2024, 3, 20), dec!(49.50), None),
            expense(date(2023, 12, 31), dec!(999), Some("Travel")),
        ];
        let income = vec![
            income(date(2024, 1, 15), dec!(4000)),
            income(date(2024, 2, 15), dec!(4000)),
            income(date(2024, 3, 15), dec!(4000)),
        ];

        let summary = summarize_budget(&expenses, &income, 2024);
        assert_eq!(summary.total_expenses, dec!(2600));
        assert_eq!(summary.total_income, dec!(12000));
        assert_eq!(summary.net_savings, dec!(9400));
        assert_eq!(summary.savings_rate, Some(dec!(78.33)));
        // January and March only
        assert_eq!(summary.average_monthly_expenses, Some(dec!(1300)));
        assert_eq!(summary.average_monthly_income, Some(dec!(4000)));

        let categories: Vec<(&str, Decimal)> = summary
            .expenses_by_category
            .iter()
            .map(|c| (c.category.as_str(), c.amount))
            .collect();
        assert_eq!(
            categories,
            vec![
                ("Rent", dec!(2400)),
                ("Groceries", dec!(150.50)),
                (UNKNOWN_GROUP, dec!(49.50)),
            ]
        );
        assert_eq!(summary.last_expense_date, Some(date(2024, 3, 20)));
    }

    #[test]
    fn test_no_income_has_no_savings_rate() {
        let summary = summarize_budget(
            &[expense(date(2024, 5, 1), dec!(10), Some("Coffee"))],
            &[],
            2024,
        );
        assert_eq!(summary.savings_rate, None);
        assert_eq!(summary.average_monthly_income, None);
        assert_eq!(summary.last_income_date, None);
    }

    #[test]
    fn test_expense_csv_row_with_timestamp() {
        let data = "Amount,Date,Expense_Category,Description\n\
                    42.10,2024-02-01 00:00:00,Utilities,Electric bill\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<Expense> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].date, date(2024, 2, 1));
        assert_eq!(rows[0].expense_category.as_deref(), Some("Utilities"));
    }
}
