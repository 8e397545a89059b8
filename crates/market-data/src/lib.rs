//! Finboard Market Data Crate
//!
//! Provider-agnostic access to the external data the portfolio pipeline
//! depends on.
//!
//! # Overview
//!
//! The pipeline talks to three kinds of external collaborators, each
//! modelled as a narrow capability trait so it can be mocked in tests:
//!
//! - [`HoldingsProvider`] - current brokerage positions, fundamentals,
//!   analyst ratings and the top-N market movers list
//! - [`PriceHistoryProvider`] - daily closing prices by symbol and date range
//! - [`GeocodingProvider`] - best-effort address to coordinates lookup
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  Refresh Cycle   | --> |  PriceFetcher    |  (chunked, bounded, retried)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   RateLimiter    |  (token bucket per provider)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Provider      |  (Yahoo, Nominatim, mocks)
//!                          +------------------+
//! ```

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::{MarketDataError, RetryClass};

pub use models::{
    BrokerPosition, DailyClose, Fundamentals, GeoPoint, LatestQuote, MarketMover, RatingRatios,
    RatingSummary,
};

pub use provider::nominatim::NominatimGeocoder;
pub use provider::yahoo::YahooProvider;
pub use provider::{GeocodingProvider, HoldingsProvider, PriceHistoryProvider};

pub use registry::{
    BatchFetchOutcome, FetchFailure, FetchPolicy, PriceFetcher, PriceRequest, RateLimitConfig,
    RateLimiter,
};
