use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use finboard_market_data::{HoldingsProvider, MarketMover};
use futures::future::join_all;
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::opportunities_model::{NewBuyOpportunity, NewBuyScan};
use crate::constants::{DISPLAY_DECIMAL_PRECISION, NEW_BUY_UNIVERSE_SIZE};
use crate::errors::{DataQualityWarning, Result, WarningKind};
use crate::utils::time_utils::bounded_call;

#[async_trait]
pub trait NewBuyServiceTrait: Send + Sync {
    /// Candidates from the provider's top-movers list that are not in
    /// `owned`, enriched with quote, fundamentals and rating ratios.
    ///
    /// Fails only when the movers list itself cannot be fetched.
    async fn scan(&self, owned: &BTreeSet<String>) -> Result<NewBuyScan>;
}

pub struct NewBuyService {
    provider: Arc<dyn HoldingsProvider>,
    request_timeout: Duration,
    universe_size: usize,
}

impl NewBuyService {
    pub fn new(provider: Arc<dyn HoldingsProvider>, request_timeout: Duration) -> Self {
        Self {
            provider,
            request_timeout,
            universe_size: NEW_BUY_UNIVERSE_SIZE,
        }
    }

    pub fn with_universe_size(mut self, universe_size: usize) -> Self {
        self.universe_size = universe_size;
        self
    }

    async fn enrich(&self, mover: MarketMover) -> (NewBuyOpportunity, Vec<DataQualityWarning>) {
        let provider_id = self.provider.id();
        let symbol = mover.symbol.trim().to_string();
        let mut warnings = Vec::new();
        let mut opportunity = NewBuyOpportunity {
            symbol: symbol.clone(),
            name: mover.name,
            ..NewBuyOpportunity::default()
        };

        let (quote, fundamentals, ratings) = futures::join!(
            bounded_call(
                self.request_timeout,
                provider_id,
                self.provider.latest_quote(&symbol)
            ),
            bounded_call(
                self.request_timeout,
                provider_id,
                self.provider.fundamentals(&symbol)
            ),
            bounded_call(self.request_timeout, provider_id, self.provider.ratings(&symbol)),
        );

        match quote {
            Ok(quote) => {
                opportunity.last_trade_price = quote.last_trade_price;
                opportunity.previous_close = quote.previous_close;
                opportunity.daily_pct_change =
                    daily_pct_change(quote.last_trade_price, quote.previous_close);
            }
            Err(e) => warnings.push(
                DataQualityWarning::for_security(
                    WarningKind::FetchFailed,
                    &symbol,
                    format!("latest quote unavailable: {}", e),
                )
                .logged(),
            ),
        }

        match fundamentals {
            Ok(f) => {
                opportunity.market_cap = f.market_cap.map(|cap| (cap / dec!(1000000000)).round_dp(1));
                opportunity.pe_ratio = f.pe_ratio.map(|v| v.round_dp(DISPLAY_DECIMAL_PRECISION));
                opportunity.pb_ratio = f.pb_ratio.map(|v| v.round_dp(DISPLAY_DECIMAL_PRECISION));
                opportunity.dividend_yield = f.dividend_yield;
                opportunity.sector = f.sector;
                opportunity.industry = f.industry;
                opportunity.high_52_week = f.high_52_weeks;
                opportunity.low_52_week = f.low_52_weeks;
                if opportunity.name.is_none() {
                    opportunity.name = f.name;
                }
            }
            Err(e) => warnings.push(
                DataQualityWarning::for_security(
                    WarningKind::MissingFundamentals,
                    &symbol,
                    format!("fundamentals unavailable: {}", e),
                )
                .logged(),
            ),
        }

        match ratings.map(|r| r.ratios()) {
            Ok(Some(ratios)) => {
                opportunity.buy_ratio = Some(ratios.buy);
                opportunity.hold_ratio = Some(ratios.hold);
                opportunity.sell_ratio = Some(ratios.sell);
            }
            Ok(None) => debug!("No analyst ratings for {}", symbol),
            Err(e) => warnings.push(
                DataQualityWarning::for_security(
                    WarningKind::MissingFundamentals,
                    &symbol,
                    format!("analyst ratings unavailable: {}", e),
                )
                .logged(),
            ),
        }

        (opportunity, warnings)
    }
}

#[async_trait]
impl NewBuyServiceTrait for NewBuyService {
    async fn scan(&self, owned: &BTreeSet<String>) -> Result<NewBuyScan> {
        let movers = bounded_call(
            self.request_timeout,
            self.provider.id(),
            self.provider.top_movers(self.universe_size),
        )
        .await?;

        let mut seen = BTreeSet::new();
        let candidates: Vec<MarketMover> = movers
            .into_iter()
            .filter(|m| !owned.contains(m.symbol.trim()))
            .filter(|m| seen.insert(m.symbol.trim().to_string()))
            .collect();
        info!(
            "Enriching {} new-buy candidates from {}",
            candidates.len(),
            self.provider.id()
        );

        let enriched = join_all(candidates.into_iter().map(|m| self.enrich(m))).await;

        let mut scan = NewBuyScan::default();
        for (opportunity, warnings) in enriched {
            scan.opportunities.push(opportunity);
            scan.warnings.extend(warnings);
        }
        Ok(scan)
    }
}

/// `(last - previous) / previous × 100` at 2 decimal places; `None` when
/// either price is missing or the previous close is zero.
pub fn daily_pct_change(last: Option<Decimal>, previous: Option<Decimal>) -> Option<Decimal> {
    match (last, previous) {
        (Some(last), Some(previous)) if !previous.is_zero() => Some(
            ((last - previous) / previous * Decimal::ONE_HUNDRED).round_dp(DISPLAY_DECIMAL_PRECISION),
        ),
        _ => None,
    }
}

/// Orders candidates by `daily_pct_change` descending; unknown changes go
/// last and ties are ordered by symbol.
pub fn rank_new_buys(mut opportunities: Vec<NewBuyOpportunity>) -> Vec<NewBuyOpportunity> {
    opportunities.sort_by(|a, b| {
        let by_change = match (a.daily_pct_change, b.daily_pct_change) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_change.then_with(|| a.symbol.cmp(&b.symbol))
    });
    opportunities
}
