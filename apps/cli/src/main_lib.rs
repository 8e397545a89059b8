use std::sync::Arc;

use finboard_core::refresh::RefreshService;
use finboard_core::storage::FlatFileStore;
use finboard_market_data::{
    FetchPolicy, PriceFetcher, RateLimitConfig, RateLimiter, YahooProvider,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LogFormat};

pub fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

pub fn build_store(config: &Config) -> FlatFileStore {
    FlatFileStore::new(config.data_dir.clone())
}

/// Wires the Yahoo price provider behind the rate limiter and fetch policy.
pub fn build_refresh_service(config: &Config) -> anyhow::Result<RefreshService> {
    let provider = Arc::new(YahooProvider::new()?);
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        requests_per_minute: config.requests_per_minute,
        ..RateLimitConfig::default()
    }));
    let policy = FetchPolicy {
        request_timeout: config.fetch_timeout,
        concurrency: config.fetch_concurrency,
        max_retries: config.fetch_max_retries,
        ..FetchPolicy::default()
    };
    let fetcher = Arc::new(PriceFetcher::new(provider, limiter, policy));

    Ok(RefreshService::new(build_store(config), fetcher))
}
