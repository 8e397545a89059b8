use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use finboard_market_data::MarketDataError;

/// Default timezone for valuation dates. Market closes are US-centric, so
/// "today" is the current date in New York.
pub const DEFAULT_VALUATION_TZ: Tz = chrono_tz::America::New_York;

/// Converts a UTC instant to a valuation date in the given timezone.
pub fn valuation_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Convenience function that uses the default valuation timezone.
pub fn valuation_date_today() -> NaiveDate {
    valuation_date_from_utc(Utc::now(), DEFAULT_VALUATION_TZ)
}

/// The day after `date`, saturating at the last representable date.
pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

/// Awaits a provider call for at most `limit`; an elapsed call becomes
/// [`MarketDataError::Timeout`].
pub async fn bounded_call<T, F>(
    limit: Duration,
    provider: &str,
    fut: F,
) -> Result<T, MarketDataError>
where
    F: Future<Output = Result<T, MarketDataError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(MarketDataError::Timeout {
            provider: provider.to_string(),
        }),
    }
}
