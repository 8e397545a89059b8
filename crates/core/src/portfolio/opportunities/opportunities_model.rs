use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DataQualityWarning;

/// A held security with its composite rebuy score.
///
/// Each component is rounded to 2 decimal places and clamped to its range;
/// `buy_score` is their sum and lies in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuyOpportunity {
    pub symbol: String,
    pub company: Option<String>,
    pub sector: String,
    pub price: Decimal,
    pub market_value: Decimal,
    pub high_52_week: Option<Decimal>,
    pub low_52_week: Option<Decimal>,
    pub buy_ratio: Option<Decimal>,
    pub sell_ratio: Option<Decimal>,
    /// 0-20, lower for larger positions.
    pub market_score: Decimal,
    /// 0-20, lower for heavier sectors.
    pub sector_score: Decimal,
    /// 0-30, higher near the 52-week low.
    pub highlow_score: Decimal,
    /// 0-30, analyst buy minus sell ratio.
    pub buyholdsell_score: Decimal,
    pub buy_score: Decimal,
}

/// A security not currently held, enriched but unscored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBuyOpportunity {
    pub symbol: String,
    pub name: Option<String>,
    pub last_trade_price: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    /// `(last - previous) / previous × 100`, 2 decimal places.
    pub daily_pct_change: Option<Decimal>,
    /// Billions of dollars, 1 decimal place.
    pub market_cap: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub pb_ratio: Option<Decimal>,
    pub dividend_yield: Option<Decimal>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub high_52_week: Option<Decimal>,
    pub low_52_week: Option<Decimal>,
    pub buy_ratio: Option<Decimal>,
    pub hold_ratio: Option<Decimal>,
    pub sell_ratio: Option<Decimal>,
}

/// Either kind of opportunity, for consumers that list both together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OpportunityRecord {
    NewBuy(NewBuyOpportunity),
    Rebuy(RebuyOpportunity),
}

impl OpportunityRecord {
    pub fn symbol(&self) -> &str {
        match self {
            OpportunityRecord::NewBuy(o) => &o.symbol,
            OpportunityRecord::Rebuy(o) => &o.symbol,
        }
    }
}

impl From<NewBuyOpportunity> for OpportunityRecord {
    fn from(opportunity: NewBuyOpportunity) -> Self {
        OpportunityRecord::NewBuy(opportunity)
    }
}

impl From<RebuyOpportunity> for OpportunityRecord {
    fn from(opportunity: RebuyOpportunity) -> Self {
        OpportunityRecord::Rebuy(opportunity)
    }
}

/// Result of a new-buy scan.
#[derive(Debug, Clone, Default)]
pub struct NewBuyScan {
    pub opportunities: Vec<NewBuyOpportunity>,
    pub warnings: Vec<DataQualityWarning>,
}
