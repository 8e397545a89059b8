//! Batch download of daily closes.
//!
//! Requests are issued in fixed-size chunks. Each request is rate limited,
//! bounded by a timeout and retried with exponential backoff when its error
//! is transient. A failing symbol is reported in
//! [`BatchFetchOutcome::failures`] and never aborts the batch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use log::{debug, info, warn};

use super::rate_limiter::RateLimiter;
use crate::errors::{MarketDataError, RetryClass};
use crate::models::DailyClose;
use crate::provider::PriceHistoryProvider;

/// One symbol's requested date range (inclusive on both ends).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct FetchPolicy {
    /// Upper bound for a single provider call.
    pub request_timeout: Duration,
    /// Number of requests in flight at once.
    pub concurrency: usize,
    /// Retries after the first attempt for transient errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every subsequent retry.
    pub initial_backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
            concurrency: 5,
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// A symbol whose fetch failed after exhausting its retry budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchFailure {
    pub symbol: String,
    pub error: String,
    pub attempts: u32,
}

#[derive(Debug, Default)]
pub struct BatchFetchOutcome {
    /// Closes per symbol, ascending by date. Symbols with no data in range
    /// map to an empty vector.
    pub prices: BTreeMap<String, Vec<DailyClose>>,
    pub failures: Vec<FetchFailure>,
}

pub struct PriceFetcher {
    provider: Arc<dyn PriceHistoryProvider>,
    limiter: Arc<RateLimiter>,
    policy: FetchPolicy,
}

impl PriceFetcher {
    pub fn new(
        provider: Arc<dyn PriceHistoryProvider>,
        limiter: Arc<RateLimiter>,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            provider,
            limiter,
            policy,
        }
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Fetches every request, `concurrency` at a time.
    pub async fn fetch_all(&self, requests: &[PriceRequest]) -> BatchFetchOutcome {
        let mut outcome = BatchFetchOutcome::default();
        let chunk_size = self.policy.concurrency.max(1);

        for chunk in requests.chunks(chunk_size) {
            let results = join_all(chunk.iter().map(|request| self.fetch_one(request))).await;

            for (request, result) in chunk.iter().zip(results) {
                match result {
                    Ok(closes) => {
                        debug!("Fetched {} closes for {}", closes.len(), request.symbol);
                        outcome.prices.insert(request.symbol.clone(), closes);
                    }
                    Err((MarketDataError::NoDataForRange, _)) => {
                        debug!(
                            "No closes for {} between {} and {}",
                            request.symbol, request.start, request.end
                        );
                        outcome.prices.insert(request.symbol.clone(), Vec::new());
                    }
                    Err((err, attempts)) => {
                        warn!(
                            "Price fetch for {} failed after {} attempt(s): {}",
                            request.symbol, attempts, err
                        );
                        outcome.failures.push(FetchFailure {
                            symbol: request.symbol.clone(),
                            error: err.to_string(),
                            attempts,
                        });
                    }
                }
            }
        }

        info!(
            "Price fetch from {} finished: {} succeeded, {} failed",
            self.provider.id(),
            outcome.prices.len(),
            outcome.failures.len()
        );
        outcome
    }

    async fn fetch_one(
        &self,
        request: &PriceRequest,
    ) -> Result<Vec<DailyClose>, (MarketDataError, u32)> {
        let provider_id = self.provider.id();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            self.limiter.acquire(provider_id).await;

            let result = match tokio::time::timeout(
                self.policy.request_timeout,
                self.provider
                    .daily_closes(&request.symbol, request.start, request.end),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(MarketDataError::Timeout {
                    provider: provider_id.to_string(),
                }),
            };

            match result {
                Ok(closes) => return Ok(closes),
                Err(err)
                    if err.retry_class() == RetryClass::WithBackoff
                        && attempt <= self.policy.max_retries =>
                {
                    let delay = self.policy.initial_backoff * 2u32.saturating_pow(attempt - 1);
                    debug!(
                        "Retrying {} in {:?} after attempt {}: {}",
                        request.symbol, delay, attempt, err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err((err, attempt)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RateLimitConfig;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[derive(Clone, Copy)]
    enum Behaviour {
        Ok,
        NotFound,
        FailTimes(u32),
        Hang,
        Empty,
    }

    struct MockPriceProvider {
        behaviours: HashMap<String, Behaviour>,
        calls: Mutex<HashMap<String, u32>>,
    }

    impl MockPriceProvider {
        fn new(behaviours: &[(&str, Behaviour)]) -> Self {
            Self {
                behaviours: behaviours
                    .iter()
                    .map(|(s, b)| (s.to_string(), *b))
                    .collect(),
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn calls(&self, symbol: &str) -> u32 {
            self.calls.lock().unwrap().get(symbol).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl PriceHistoryProvider for MockPriceProvider {
        fn id(&self) -> &'static str {
            "MOCK"
        }

        async fn daily_closes(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<DailyClose>, MarketDataError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let entry = calls.entry(symbol.to_string()).or_insert(0);
                *entry += 1;
                *entry
            };
            match self.behaviours.get(symbol).copied().unwrap_or(Behaviour::Ok) {
                Behaviour::Ok => Ok(vec![DailyClose::new(symbol, start, dec!(10))]),
                Behaviour::NotFound => Err(MarketDataError::SymbolNotFound(symbol.to_string())),
                Behaviour::FailTimes(n) if call <= n => Err(MarketDataError::RateLimited {
                    provider: "MOCK".to_string(),
                }),
                Behaviour::FailTimes(_) => Ok(vec![DailyClose::new(symbol, start, dec!(11))]),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
                Behaviour::Empty => Err(MarketDataError::NoDataForRange),
            }
        }
    }

    fn fetcher(provider: Arc<MockPriceProvider>) -> PriceFetcher {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60_000,
            burst_capacity: 100.0,
        }));
        PriceFetcher::new(
            provider,
            limiter,
            FetchPolicy {
                request_timeout: Duration::from_secs(5),
                concurrency: 2,
                max_retries: 2,
                initial_backoff: Duration::from_millis(10),
            },
        )
    }

    fn requests(symbols: &[&str]) -> Vec<PriceRequest> {
        symbols
            .iter()
            .map(|s| PriceRequest {
                symbol: s.to_string(),
                start: date(1),
                end: date(5),
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_failure_does_not_abort_batch() {
        let provider = Arc::new(MockPriceProvider::new(&[("BAD", Behaviour::NotFound)]));
        let outcome = fetcher(provider.clone())
            .fetch_all(&requests(&["AAPL", "BAD", "MSFT"]))
            .await;

        assert_eq!(outcome.prices.len(), 2);
        assert!(outcome.prices.contains_key("AAPL"));
        assert!(outcome.prices.contains_key("MSFT"));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].symbol, "BAD");
        assert_eq!(outcome.failures[0].attempts, 1);
        assert_eq!(provider.calls("BAD"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let provider = Arc::new(MockPriceProvider::new(&[("FLAKY", Behaviour::FailTimes(2))]));
        let outcome = fetcher(provider.clone())
            .fetch_all(&requests(&["FLAKY"]))
            .await;

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.prices["FLAKY"][0].close, dec!(11));
        assert_eq!(provider.calls("FLAKY"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_is_bounded() {
        let provider = Arc::new(MockPriceProvider::new(&[("DOWN", Behaviour::FailTimes(10))]));
        let outcome = fetcher(provider.clone()).fetch_all(&requests(&["DOWN"])).await;

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].attempts, 3);
        assert_eq!(provider.calls("DOWN"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_request_times_out() {
        let provider = Arc::new(MockPriceProvider::new(&[("SLOW", Behaviour::Hang)]));
        let outcome = fetcher(provider).fetch_all(&requests(&["SLOW", "AAPL"])).await;

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].symbol, "SLOW");
        assert!(outcome.failures[0].error.starts_with("Timeout"));
        assert!(outcome.prices.contains_key("AAPL"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_data_in_range_is_not_a_failure() {
        let provider = Arc::new(MockPriceProvider::new(&[("QUIET", Behaviour::Empty)]));
        let outcome = fetcher(provider).fetch_all(&requests(&["QUIET"])).await;

        assert!(outcome.failures.is_empty());
        assert!(outcome.prices["QUIET"].is_empty());
    }
}
