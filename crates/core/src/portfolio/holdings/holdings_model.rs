use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{MID_CAP_LIMIT_BILLIONS, SMALL_CAP_LIMIT_BILLIONS};

/// Market capitalization bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CapSize {
    #[serde(rename = "Small-Cap")]
    SmallCap,
    #[serde(rename = "Mid-Cap")]
    MidCap,
    #[serde(rename = "Large-Cap")]
    LargeCap,
}

impl CapSize {
    /// Below $2B is small-cap, below $10B mid-cap, anything else large-cap.
    pub fn from_market_cap_billions(market_cap: Decimal) -> Self {
        if market_cap < Decimal::from(SMALL_CAP_LIMIT_BILLIONS) {
            CapSize::SmallCap
        } else if market_cap < Decimal::from(MID_CAP_LIMIT_BILLIONS) {
            CapSize::MidCap
        } else {
            CapSize::LargeCap
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapSize::SmallCap => "Small-Cap",
            CapSize::MidCap => "Mid-Cap",
            CapSize::LargeCap => "Large-Cap",
        }
    }
}

impl fmt::Display for CapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `stocks.csv`: a position as reported by the brokerage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockHolding {
    #[serde(rename = "Stock")]
    pub symbol: String,
    #[serde(rename = "Company", default)]
    pub company: Option<String>,
    #[serde(rename = "Price")]
    pub price: Decimal,
    #[serde(rename = "Quantity")]
    pub quantity: Decimal,
    #[serde(rename = "Avg_Cost")]
    pub avg_cost: Decimal,
    #[serde(rename = "Market_Value")]
    pub market_value: Decimal,
    #[serde(rename = "Percent_Change", default)]
    pub percent_change: Option<Decimal>,
    #[serde(rename = "Equity_Change", default)]
    pub equity_change: Option<Decimal>,
    #[serde(rename = "52_Week_High", default)]
    pub high_52_week: Option<Decimal>,
    #[serde(rename = "52_Week_Low", default)]
    pub low_52_week: Option<Decimal>,
    #[serde(rename = "Asset_Type", default)]
    pub asset_type: Option<String>,
}

/// One row of `stock_info.csv`. `Company` holds the ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(rename = "Company")]
    pub symbol: String,
    #[serde(rename = "CEO", default)]
    pub ceo: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    #[serde(rename = "State", default)]
    pub state: Option<String>,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    /// Billions of dollars, 1 decimal place.
    #[serde(rename = "Market_Cap", default)]
    pub market_cap: Option<Decimal>,
    /// Millions of shares, 1 decimal place.
    #[serde(rename = "Avg_Volume", default)]
    pub avg_volume: Option<Decimal>,
    #[serde(rename = "Shares_Outstanding", default)]
    pub shares_outstanding: Option<Decimal>,
    #[serde(rename = "PE_Ratio", default)]
    pub pe_ratio: Option<Decimal>,
    #[serde(rename = "PB_Ratio", default)]
    pub pb_ratio: Option<Decimal>,
    #[serde(rename = "Dividend_Yield", default)]
    pub dividend_yield: Option<Decimal>,
    #[serde(rename = "Beta", default)]
    pub beta: Option<Decimal>,
    #[serde(rename = "Sector", default)]
    pub sector: Option<String>,
    #[serde(rename = "Industry", default)]
    pub industry: Option<String>,
    #[serde(rename = "Buy_Ratio", default)]
    pub buy_ratio: Option<Decimal>,
    #[serde(rename = "Hold_Ratio", default)]
    pub hold_ratio: Option<Decimal>,
    #[serde(rename = "Sell_Ratio", default)]
    pub sell_ratio: Option<Decimal>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    /// Headquarters latitude in decimal degrees, 6 decimal places.
    #[serde(rename = "Lat", default)]
    pub lat: Option<Decimal>,
    #[serde(rename = "Lng", default)]
    pub lng: Option<Decimal>,
}

impl CompanyProfile {
    pub fn cap_size(&self) -> Option<CapSize> {
        self.market_cap.map(CapSize::from_market_cap_billions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// A held position with its share of the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSummary {
    pub symbol: String,
    pub company: Option<String>,
    pub quantity: Decimal,
    pub price: Decimal,
    pub avg_cost: Decimal,
    pub market_value: Decimal,
    /// `quantity × avg_cost`
    pub invested: Decimal,
    pub equity_change: Decimal,
    pub percent_change: Option<Decimal>,
    /// Percent of total market value, 2 decimal places.
    pub portfolio_diversity: Decimal,
    pub direction: Direction,
    pub asset_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub companies: usize,
    pub market_value: Decimal,
    pub invested: Decimal,
    pub equity_change: Decimal,
    /// `equity_change / invested × 100`, `None` when nothing is invested.
    pub percent_change: Option<Decimal>,
}
