use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Portfolio totals for one date across all securities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEquity {
    pub date: NaiveDate,
    pub market_value: Decimal,
    pub equity: Decimal,
    pub total_profit: Decimal,
    /// Change in `total_profit` from the previous date, rounded to 2 places.
    /// `None` on the first date.
    pub daily_profit: Option<Decimal>,
}
