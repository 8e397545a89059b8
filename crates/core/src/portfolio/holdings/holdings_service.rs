use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::holdings_model::{CompanyProfile, Direction, HoldingSummary, PortfolioTotals, StockHolding};
use crate::constants::DISPLAY_DECIMAL_PRECISION;

/// Asset type assumed when the holdings table leaves it blank.
pub const DEFAULT_ASSET_TYPE: &str = "Stock";

/// Summaries for held positions (quantity > 0), largest market value first.
pub fn summarize_holdings(holdings: &[StockHolding]) -> Vec<HoldingSummary> {
    let held: Vec<&StockHolding> = holdings
        .iter()
        .filter(|h| h.quantity > Decimal::ZERO)
        .collect();
    let total_market_value: Decimal = held.iter().map(|h| h.market_value).sum();

    let mut summaries: Vec<HoldingSummary> = held
        .into_iter()
        .map(|h| {
            let portfolio_diversity = if total_market_value.is_zero() {
                Decimal::ZERO
            } else {
                (h.market_value * dec!(100) / total_market_value).round_dp(DISPLAY_DECIMAL_PRECISION)
            };
            let direction = match h.percent_change {
                Some(change) if change > Decimal::ZERO => Direction::Up,
                _ => Direction::Down,
            };
            HoldingSummary {
                symbol: h.symbol.clone(),
                company: h.company.clone(),
                quantity: h.quantity,
                price: h.price,
                avg_cost: h.avg_cost,
                market_value: h.market_value,
                invested: h.quantity * h.avg_cost,
                equity_change: h.equity_change.unwrap_or(Decimal::ZERO),
                percent_change: h.percent_change,
                portfolio_diversity,
                direction,
                asset_type: asset_type_of(h).to_string(),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.market_value
            .cmp(&a.market_value)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    summaries
}

pub fn portfolio_totals(summaries: &[HoldingSummary]) -> PortfolioTotals {
    let market_value: Decimal = summaries.iter().map(|s| s.market_value).sum();
    let invested: Decimal = summaries.iter().map(|s| s.invested).sum();
    let equity_change: Decimal = summaries.iter().map(|s| s.equity_change).sum();
    let percent_change = if invested.is_zero() {
        None
    } else {
        Some((equity_change / invested * dec!(100)).round_dp(DISPLAY_DECIMAL_PRECISION))
    };

    PortfolioTotals {
        companies: summaries.len(),
        market_value,
        invested,
        equity_change,
        percent_change,
    }
}

/// Profiles keyed by ticker. Later duplicates replace earlier ones.
pub fn index_profiles(profiles: &[CompanyProfile]) -> BTreeMap<String, CompanyProfile> {
    profiles
        .iter()
        .map(|p| (p.symbol.trim().to_string(), p.clone()))
        .collect()
}

pub fn asset_type_of(holding: &StockHolding) -> &str {
    holding
        .asset_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_ASSET_TYPE)
}
