use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use finboard_market_data::{
    BrokerPosition, Fundamentals, GeocodingProvider, HoldingsProvider, MarketDataError,
};
use futures::future::join_all;
use log::{debug, info};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::holdings_model::{CompanyProfile, StockHolding};
use super::holdings_service::DEFAULT_ASSET_TYPE;
use crate::errors::{DataQualityWarning, Result, WarningKind};
use crate::utils::time_utils::bounded_call;

/// Rebuilt holdings table with the problems met along the way.
#[derive(Debug, Clone, Default)]
pub struct HoldingsRefresh {
    pub holdings: Vec<StockHolding>,
    pub warnings: Vec<DataQualityWarning>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfilesRefresh {
    pub profiles: Vec<CompanyProfile>,
    pub warnings: Vec<DataQualityWarning>,
}

#[async_trait]
pub trait HoldingsRefreshServiceTrait: Send + Sync {
    /// Rebuilds `stocks.csv` rows from the brokerage's current positions.
    /// Fails only when the positions themselves cannot be fetched.
    async fn refresh_holdings(&self) -> Result<HoldingsRefresh>;

    /// Rebuilds `stock_info.csv` rows for `symbols`. Never fails; missing
    /// pieces become empty fields plus a warning.
    async fn refresh_profiles(&self, symbols: &[String]) -> ProfilesRefresh;
}

pub struct HoldingsRefreshService {
    provider: Arc<dyn HoldingsProvider>,
    geocoder: Option<Arc<dyn GeocodingProvider>>,
    request_timeout: Duration,
}

impl HoldingsRefreshService {
    pub fn new(
        provider: Arc<dyn HoldingsProvider>,
        geocoder: Option<Arc<dyn GeocodingProvider>>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            geocoder,
            request_timeout,
        }
    }

    async fn bounded<T, F>(&self, provider: &str, fut: F) -> std::result::Result<T, MarketDataError>
    where
        F: Future<Output = std::result::Result<T, MarketDataError>>,
    {
        bounded_call(self.request_timeout, provider, fut).await
    }

    async fn holding_from_position(
        &self,
        position: BrokerPosition,
    ) -> (StockHolding, Vec<DataQualityWarning>) {
        let mut warnings = Vec::new();
        let symbol = position.symbol.trim().to_string();

        let fundamentals = match self
            .bounded(self.provider.id(), self.provider.fundamentals(&symbol))
            .await
        {
            Ok(f) => Some(f),
            Err(e) => {
                warnings.push(
                    DataQualityWarning::for_security(
                        WarningKind::MissingFundamentals,
                        &symbol,
                        format!("52-week range unavailable: {}", e),
                    )
                    .logged(),
                );
                None
            }
        };

        let price = match position.price {
            Some(price) => price.round_dp(2),
            None => {
                warnings.push(
                    DataQualityWarning::for_security(
                        WarningKind::MissingFundamentals,
                        &symbol,
                        "broker reported no price; market value set to zero",
                    )
                    .logged(),
                );
                Decimal::ZERO
            }
        };

        let holding = StockHolding {
            company: position.name,
            price,
            quantity: position.quantity,
            avg_cost: position.average_buy_price.round_dp(2),
            market_value: (price * position.quantity).round_dp(2),
            percent_change: position.percent_change,
            equity_change: position.equity_change.map(|c| c.round_dp(2)),
            high_52_week: fundamentals
                .as_ref()
                .and_then(|f| f.high_52_weeks)
                .map(|v| v.round_dp(2)),
            low_52_week: fundamentals
                .as_ref()
                .and_then(|f| f.low_52_weeks)
                .map(|v| v.round_dp(2)),
            asset_type: Some(normalize_asset_type(position.asset_type.as_deref())),
            symbol,
        };
        (holding, warnings)
    }

    async fn build_profile(&self, symbol: &str) -> (CompanyProfile, Vec<DataQualityWarning>) {
        let mut warnings = Vec::new();
        let mut profile = CompanyProfile {
            symbol: symbol.to_string(),
            ..CompanyProfile::default()
        };

        match self
            .bounded(self.provider.id(), self.provider.fundamentals(symbol))
            .await
        {
            Ok(fundamentals) => apply_fundamentals(&mut profile, fundamentals),
            Err(e) => warnings.push(
                DataQualityWarning::for_security(
                    WarningKind::MissingFundamentals,
                    symbol,
                    format!("fundamentals unavailable: {}", e),
                )
                .logged(),
            ),
        }

        match self
            .bounded(self.provider.id(), self.provider.ratings(symbol))
            .await
        {
            Ok(summary) => {
                if let Some(ratios) = summary.ratios() {
                    profile.buy_ratio = Some(ratios.buy);
                    profile.hold_ratio = Some(ratios.hold);
                    profile.sell_ratio = Some(ratios.sell);
                } else {
                    debug!("No analyst ratings for {}", symbol);
                }
            }
            Err(e) => warnings.push(
                DataQualityWarning::for_security(
                    WarningKind::MissingFundamentals,
                    symbol,
                    format!("ratings unavailable: {}", e),
                )
                .logged(),
            ),
        }

        if let Some(warning) = self.geocode_profile(&mut profile).await {
            warnings.push(warning);
        }

        (profile, warnings)
    }

    /// Fills `lat`/`lng` from "City, State". Returns a warning on a miss.
    async fn geocode_profile(&self, profile: &mut CompanyProfile) -> Option<DataQualityWarning> {
        let geocoder = self.geocoder.as_ref()?;
        let (Some(city), Some(state)) = (profile.city.as_deref(), profile.state.as_deref()) else {
            return Some(
                DataQualityWarning::for_security(
                    WarningKind::GeocodingMiss,
                    &profile.symbol,
                    "headquarters location unknown",
                )
                .logged(),
            );
        };
        let address = format!("{}, {}", city, state);

        match self.bounded(geocoder.id(), geocoder.geocode(&address)).await {
            Ok(Some(point)) => {
                profile.lat = coordinate(point.lat);
                profile.lng = coordinate(point.lng);
                None
            }
            Ok(None) => Some(
                DataQualityWarning::for_security(
                    WarningKind::GeocodingMiss,
                    &profile.symbol,
                    format!("no match for '{}'", address),
                )
                .logged(),
            ),
            Err(e) => Some(
                DataQualityWarning::for_security(
                    WarningKind::GeocodingMiss,
                    &profile.symbol,
                    format!("geocoding '{}' failed: {}", address, e),
                )
                .logged(),
            ),
        }
    }
}

#[async_trait]
impl HoldingsRefreshServiceTrait for HoldingsRefreshService {
    async fn refresh_holdings(&self) -> Result<HoldingsRefresh> {
        let positions = self
            .bounded(self.provider.id(), self.provider.current_positions())
            .await?;
        info!(
            "Refreshing holdings table from {} positions at {}",
            positions.len(),
            self.provider.id()
        );

        let built = join_all(
            positions
                .into_iter()
                .map(|position| self.holding_from_position(position)),
        )
        .await;

        let mut refresh = HoldingsRefresh::default();
        for (holding, warnings) in built {
            refresh.holdings.push(holding);
            refresh.warnings.extend(warnings);
        }
        refresh.holdings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(refresh)
    }

    async fn refresh_profiles(&self, symbols: &[String]) -> ProfilesRefresh {
        let built = join_all(symbols.iter().map(|symbol| self.build_profile(symbol))).await;

        let mut refresh = ProfilesRefresh::default();
        for (profile, warnings) in built {
            refresh.profiles.push(profile);
            refresh.warnings.extend(warnings);
        }
        info!(
            "Refreshed {} company profiles with {} warnings",
            refresh.profiles.len(),
            refresh.warnings.len()
        );
        refresh
    }
}

fn apply_fundamentals(profile: &mut CompanyProfile, fundamentals: Fundamentals) {
    let round = |value: Option<Decimal>, dp: u32| value.map(|v| v.round_dp(dp));

    profile.ceo = fundamentals.ceo;
    profile.country = fundamentals.country;
    profile.state = fundamentals.state;
    profile.city = fundamentals.city;
    profile.market_cap = round(fundamentals.market_cap.map(|v| v / dec!(1000000000)), 1);
    profile.avg_volume = round(fundamentals.average_volume.map(|v| v / dec!(1000000)), 1);
    profile.shares_outstanding = round(fundamentals.shares_outstanding, 2);
    profile.pe_ratio = round(fundamentals.pe_ratio, 2);
    profile.pb_ratio = round(fundamentals.pb_ratio, 2);
    profile.dividend_yield = fundamentals.dividend_yield;
    profile.beta = round(fundamentals.beta, 2);
    profile.sector = fundamentals.sector;
    profile.industry = fundamentals.industry;
    profile.description = fundamentals.description;
}

/// "stock" -> "Stock", "etp" -> "Etp"; blank falls back to "Stock".
/// Geocoder degrees as a decimal; NaN or infinite values are dropped.
fn coordinate(degrees: f64) -> Option<Decimal> {
    Decimal::from_f64(degrees).map(|d| d.round_dp(6))
}

fn normalize_asset_type(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => DEFAULT_ASSET_TYPE.to_string(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}
