//! Capability traits for external data sources.
//!
//! Every method returns `MarketDataError` on failure. Callers degrade
//! gracefully per item; a single failing symbol never aborts a batch.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::{
    BrokerPosition, DailyClose, Fundamentals, GeoPoint, LatestQuote, MarketMover, RatingSummary,
};

/// Brokerage-style data source: positions, fundamentals, ratings and
/// market-wide movers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use finboard_market_data::{HoldingsProvider, MarketDataError};
///
/// struct MyBroker;
///
/// #[async_trait]
/// impl HoldingsProvider for MyBroker {
///     fn id(&self) -> &'static str {
///         "MY_BROKER"
///     }
///     // ... implement the data methods
/// }
/// ```
#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    /// Unique identifier, used for logging and rate limiting.
    fn id(&self) -> &'static str;

    /// Positions currently held in the account.
    async fn current_positions(&self) -> Result<Vec<BrokerPosition>, MarketDataError>;

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, MarketDataError>;

    async fn ratings(&self, symbol: &str) -> Result<RatingSummary, MarketDataError>;

    async fn latest_quote(&self, symbol: &str) -> Result<LatestQuote, MarketDataError>;

    /// The provider's top-N market list, in provider order.
    async fn top_movers(&self, limit: usize) -> Result<Vec<MarketMover>, MarketDataError>;
}

/// Daily closing price history.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Unique identifier, used for logging and rate limiting.
    fn id(&self) -> &'static str;

    /// Daily closes for `symbol` between `start` and `end` (both inclusive),
    /// ordered by date ascending.
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>, MarketDataError>;
}

/// Best-effort address lookup.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Returns `Ok(None)` when the address could not be resolved.
    async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, MarketDataError>;
}
