use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Provider-sourced fundamentals for a symbol.
///
/// Every field is optional. Providers routinely omit values for ETFs,
/// foreign listings and recently listed companies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub name: Option<String>,
    pub ceo: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    /// Market capitalization in dollars.
    pub market_cap: Option<Decimal>,
    /// Average daily volume in shares.
    pub average_volume: Option<Decimal>,
    pub shares_outstanding: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub pb_ratio: Option<Decimal>,
    /// Dividend yield in percent.
    pub dividend_yield: Option<Decimal>,
    pub beta: Option<Decimal>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub year_founded: Option<i32>,
    pub high_52_weeks: Option<Decimal>,
    pub low_52_weeks: Option<Decimal>,
}

/// Analyst rating counts for a symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub num_buy_ratings: u32,
    pub num_hold_ratings: u32,
    pub num_sell_ratings: u32,
}

/// Share of each rating kind among all ratings, rounded to 2 decimal places.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRatios {
    pub buy: Decimal,
    pub hold: Decimal,
    pub sell: Decimal,
}

impl RatingSummary {
    pub fn total(&self) -> u32 {
        self.num_buy_ratings + self.num_hold_ratings + self.num_sell_ratings
    }

    /// Returns `None` when no analyst has rated the symbol.
    pub fn ratios(&self) -> Option<RatingRatios> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let total = Decimal::from(total);
        let ratio = |count: u32| (Decimal::from(count) / total).round_dp(2);
        Some(RatingRatios {
            buy: ratio(self.num_buy_ratings),
            hold: ratio(self.num_hold_ratings),
            sell: ratio(self.num_sell_ratings),
        })
    }
}

/// One entry of a provider's "top movers" market list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMover {
    pub symbol: String,
    pub name: Option<String>,
}
