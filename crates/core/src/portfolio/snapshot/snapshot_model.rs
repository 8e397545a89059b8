use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::positions::DailyPosition;

/// Open positions as of the most recent date in the daily series.
///
/// Rebuilt from the full series on every run; never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub as_of: Option<NaiveDate>,
    pub rows: Vec<DailyPosition>,
}

impl PortfolioSnapshot {
    pub fn total_market_value(&self) -> Decimal {
        self.rows.iter().map(|r| r.market_value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single entry of the gainers or losers list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub security_id: String,
    pub daily_profit: Decimal,
    pub daily_pct_profit: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMovers {
    /// Largest positive daily profit first.
    pub gainers: Vec<Mover>,
    /// Largest negative daily profit first.
    pub losers: Vec<Mover>,
}
