//! Request scheduling on top of the providers.
//!
//! - [`RateLimiter`]: token bucket per provider id
//! - [`PriceFetcher`]: chunked, bounded, retrying batch download of daily closes

mod price_fetcher;
mod rate_limiter;

pub use price_fetcher::{BatchFetchOutcome, FetchFailure, FetchPolicy, PriceFetcher, PriceRequest};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
