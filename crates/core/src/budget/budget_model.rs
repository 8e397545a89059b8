use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of `expenses.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    #[serde(rename = "Date", with = "crate::utils::date_format")]
    pub date: NaiveDate,
    #[serde(rename = "Expense_Category", default)]
    pub expense_category: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

/// One row of `income.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    #[serde(rename = "Source", default)]
    pub source: Option<String>,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    #[serde(rename = "Date", with = "crate::utils::date_format")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

/// Income and spending for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub year: i32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_savings: Decimal,
    /// Mean over the months of `year` that have at least one entry.
    pub average_monthly_income: Option<Decimal>,
    pub average_monthly_expenses: Option<Decimal>,
    /// `(income - expenses) / income × 100`; `None` without income.
    pub savings_rate: Option<Decimal>,
    /// Largest category first.
    pub expenses_by_category: Vec<CategoryTotal>,
    pub last_expense_date: Option<NaiveDate>,
    pub last_income_date: Option<NaiveDate>,
}
