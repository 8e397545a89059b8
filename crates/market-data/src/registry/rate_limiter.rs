//! Token bucket rate limiter keyed by provider id.
//!
//! Every provider gets its own bucket. Buckets are created lazily from the
//! limiter's configuration the first time a provider is seen.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Token bucket for a single provider.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
    /// Refill rate in tokens per second.
    rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn from_config(config: &RateLimitConfig) -> Self {
        let capacity = config.burst_capacity.max(1.0);
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: f64::from(config.requests_per_minute.max(1)) / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    /// Takes a token if one is available, otherwise returns the wait until
    /// the next one is.
    fn take(&mut self) -> Result<(), Duration> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / self.rate))
        }
    }
}

/// Rate limit applied to each provider.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    /// Requests that may be issued back to back before throttling starts.
    pub burst_capacity: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst_capacity: 10.0,
        }
    }
}

/// Thread-safe token bucket rate limiter shared by concurrent fetches.
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the buckets, recovering from poison. A poisoned bucket map only
    /// means slightly inaccurate throttling.
    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<String, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter buckets mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn take(&self, provider: &str) -> Result<(), Duration> {
        let mut buckets = self.lock_buckets();
        buckets
            .entry(provider.to_string())
            .or_insert_with(|| TokenBucket::from_config(&self.config))
            .take()
    }

    /// Waits asynchronously until a token for `provider` is available.
    pub async fn acquire(&self, provider: &str) {
        loop {
            match self.take(provider) {
                Ok(()) => return,
                Err(wait) => {
                    debug!("Rate limiter: waiting {:?} for provider '{}'", wait, provider);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Takes a token without waiting. Returns false when rate limited.
    pub fn try_acquire(&self, provider: &str) -> bool {
        self.take(provider).is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_capacity_is_honoured() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60,
            burst_capacity: 3.0,
        });
        for _ in 0..3 {
            assert!(limiter.try_acquire("YAHOO"));
        }
        assert!(!limiter.try_acquire("YAHOO"));
    }

    #[test]
    fn test_bucket_refills_over_time() {
        let mut bucket = TokenBucket::from_config(&RateLimitConfig {
            requests_per_minute: 60,
            burst_capacity: 1.0,
        });
        assert!(bucket.take().is_ok());
        assert!(bucket.take().is_err());

        bucket.last_update = Instant::now() - Duration::from_secs(2);
        assert!(bucket.take().is_ok());
    }

    #[test]
    fn test_providers_are_isolated() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60,
            burst_capacity: 1.0,
        });
        assert!(limiter.try_acquire("YAHOO"));
        assert!(!limiter.try_acquire("YAHOO"));
        assert!(limiter.try_acquire("NOMINATIM"));
    }

    #[tokio::test]
    async fn test_async_acquire_waits_for_refill() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 6000,
            burst_capacity: 1.0,
        });
        limiter.acquire("FAST").await;

        let start = Instant::now();
        limiter.acquire("FAST").await;
        assert!(start.elapsed().as_millis() >= 5);
    }
}
