use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::HoldingState;

/// A daily closing price for one security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub security_id: String,
    pub close_price: Decimal,
}

/// One security on one trading date, with its forward-filled holding and
/// the metrics derived from it.
///
/// `daily_profit` and `daily_pct_profit` are `None` on a security's first
/// observation; they are diffs against the previous trading date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPosition {
    pub date: NaiveDate,
    pub security_id: String,
    pub close_price: Decimal,
    pub shares_held: Decimal,
    pub avg_cost: Decimal,
    pub equity: Decimal,
    pub market_value: Decimal,
    pub total_profit: Decimal,
    pub daily_profit: Option<Decimal>,
    pub per_share_profit: Decimal,
    pub daily_pct_profit: Option<Decimal>,
}

impl DailyPosition {
    /// Builds a row from a price and the holding in force on that date.
    /// Row-local metrics are filled in; diff-based ones are left empty.
    pub fn new(
        date: NaiveDate,
        security_id: impl Into<String>,
        close_price: Decimal,
        holding: &HoldingState,
    ) -> Self {
        let mut position = Self {
            date,
            security_id: security_id.into(),
            close_price,
            shares_held: holding.shares_held,
            avg_cost: holding.avg_cost,
            equity: holding.equity,
            market_value: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            daily_profit: None,
            per_share_profit: Decimal::ZERO,
            daily_pct_profit: None,
        };
        position.apply_row_metrics();
        position
    }

    /// Recomputes market value, total profit and per-share profit.
    pub fn apply_row_metrics(&mut self) {
        self.market_value = self.close_price * self.shares_held;
        self.total_profit = self.market_value - self.equity;
        self.per_share_profit = self.close_price - self.avg_cost;
    }

    pub fn key(&self) -> (NaiveDate, &str) {
        (self.date, self.security_id.as_str())
    }
}

/// One row of `daily_stocks.csv`.
///
/// Only the first five columns are inputs. The derived columns are written
/// for downstream consumers and recomputed on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStockRecord {
    #[serde(rename = "Date", with = "crate::utils::date_format")]
    pub date: NaiveDate,
    #[serde(rename = "Close")]
    pub close: Decimal,
    #[serde(rename = "Stock")]
    pub stock: String,
    #[serde(rename = "Shares_Held")]
    pub shares_held: Decimal,
    #[serde(rename = "Avg_Cost")]
    pub avg_cost: Decimal,
    #[serde(rename = "Equity", default)]
    pub equity: Option<Decimal>,
    #[serde(rename = "Market_Value", default)]
    pub market_value: Option<Decimal>,
    #[serde(rename = "Total_Profit", default)]
    pub total_profit: Option<Decimal>,
    #[serde(rename = "Daily_Profit", default)]
    pub daily_profit: Option<Decimal>,
    #[serde(rename = "Per_Share_Profit", default)]
    pub per_share_profit: Option<Decimal>,
    #[serde(rename = "Daily_Pct_Profit", default)]
    pub daily_pct_profit: Option<Decimal>,
}

impl DailyStockRecord {
    pub fn observation(&self) -> PriceObservation {
        PriceObservation {
            date: self.date,
            security_id: self.stock.clone(),
            close_price: self.close,
        }
    }
}

impl From<&DailyPosition> for DailyStockRecord {
    fn from(position: &DailyPosition) -> Self {
        Self {
            date: position.date,
            close: position.close_price,
            stock: position.security_id.clone(),
            shares_held: position.shares_held,
            avg_cost: position.avg_cost,
            equity: Some(position.equity),
            market_value: Some(position.market_value),
            total_profit: Some(position.total_profit),
            daily_profit: position.daily_profit,
            per_share_profit: Some(position.per_share_profit),
            daily_pct_profit: position.daily_pct_profit,
        }
    }
}
