//! Yahoo Finance price history provider.
//!
//! Wraps `yahoo_finance_api` to serve daily closing prices. Only the
//! [`PriceHistoryProvider`] capability is implemented; fundamentals and
//! ratings come from the brokerage side.
//!
//! Closes are split- and dividend-adjusted (`adjclose`), so a series
//! rebuilt after a split stays continuous.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::DailyClose;
use crate::provider::PriceHistoryProvider;

const PROVIDER_ID: &str = "YAHOO";

/// Yahoo Finance daily price provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to initialize Yahoo connector: {}", e),
        })?;
        Ok(Self { connector })
    }

    /// Midnight UTC of `date` as the `time` crate type the Yahoo API expects.
    fn date_to_offset_datetime(date: NaiveDate) -> OffsetDateTime {
        let instant = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
        OffsetDateTime::from_unix_timestamp(instant.timestamp())
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    /// Convert a Yahoo quote to an adjusted daily close, keyed by the UTC
    /// trading date.
    fn yahoo_quote_to_close(
        symbol: &str,
        yahoo_quote: &yahoo::Quote,
    ) -> Result<DailyClose, MarketDataError> {
        let date = Utc
            .timestamp_opt(yahoo_quote.timestamp as i64, 0)
            .single()
            .map(|ts| ts.date_naive())
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("Invalid timestamp: {}", yahoo_quote.timestamp),
            })?;

        let close = Decimal::from_f64(yahoo_quote.adjclose)
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!(
                    "Failed to convert adjusted close {} to Decimal",
                    yahoo_quote.adjclose
                ),
            })?
            .round_dp(6);

        Ok(DailyClose::new(symbol, date, close))
    }

    fn map_yahoo_error(symbol: &str, err: yahoo::YahooError) -> MarketDataError {
        match err {
            yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
                MarketDataError::SymbolNotFound(symbol.to_string())
            }
            other => MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>, MarketDataError> {
        if start > end {
            return Ok(Vec::new());
        }

        debug!(
            "Fetching daily closes for {} from {} to {} from Yahoo",
            symbol, start, end
        );

        // Yahoo treats the end bound as exclusive.
        let end_exclusive = end.checked_add_days(Days::new(1)).unwrap_or(end);
        let response = self
            .connector
            .get_quote_history(
                symbol,
                Self::date_to_offset_datetime(start),
                Self::date_to_offset_datetime(end_exclusive),
            )
            .await
            .map_err(|e| Self::map_yahoo_error(symbol, e))?;

        let yahoo_quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(yahoo::YahooError::NoQuotes) => {
                warn!(
                    "No historical quotes returned for '{}' between {} and {}",
                    symbol, start, end
                );
                return Err(MarketDataError::NoDataForRange);
            }
            Err(e) => return Err(Self::map_yahoo_error(symbol, e)),
        };

        let mut closes: Vec<DailyClose> = yahoo_quotes
            .iter()
            .filter_map(|q| match Self::yahoo_quote_to_close(symbol, q) {
                Ok(close) => Some(close),
                Err(e) => {
                    warn!("Skipping quote due to conversion error: {:?}", e);
                    None
                }
            })
            .filter(|c| c.date >= start && c.date <= end)
            .collect();
        closes.sort_by_key(|c| c.date);
        closes.dedup_by_key(|c| c.date);

        if closes.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        Ok(closes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yahoo_quote(timestamp: i64, close: f64) -> yahoo::Quote {
        adjusted_quote(timestamp, close, close)
    }

    fn adjusted_quote(timestamp: i64, close: f64, adjclose: f64) -> yahoo::Quote {
        yahoo::Quote {
            timestamp: timestamp as _,
            open: close,
            high: close,
            low: close,
            volume: 1_000,
            close,
            adjclose,
        }
    }

    #[test]
    fn test_date_to_offset_datetime_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let converted = YahooProvider::date_to_offset_datetime(date);
        assert_eq!(converted.unix_timestamp(), 1_704_153_600);
    }

    #[test]
    fn test_quote_conversion_uses_utc_trading_date() {
        // 2024-01-02 14:30:00 UTC, the regular session open.
        let quote = yahoo_quote(1_704_205_800, 185.64);
        let close = YahooProvider::yahoo_quote_to_close("AAPL", &quote).unwrap();
        assert_eq!(close.symbol, "AAPL");
        assert_eq!(close.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(close.close, Decimal::new(18564, 2));
    }

    #[test]
    fn test_quote_conversion_uses_adjusted_close() {
        // Pre-split raw close of 400 adjusted to 100 after a 4:1 split.
        let quote = adjusted_quote(1_704_205_800, 400.0, 100.0);
        let close = YahooProvider::yahoo_quote_to_close("NVDA", &quote).unwrap();
        assert_eq!(close.close, Decimal::new(100, 0));
    }

    #[test]
    fn test_quote_conversion_rejects_nan() {
        let quote = yahoo_quote(1_704_205_800, f64::NAN);
        assert!(matches!(
            YahooProvider::yahoo_quote_to_close("AAPL", &quote),
            Err(MarketDataError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_no_quotes_maps_to_symbol_not_found() {
        let err = YahooProvider::map_yahoo_error("NOPE", yahoo::YahooError::NoQuotes);
        assert!(matches!(err, MarketDataError::SymbolNotFound(s) if s == "NOPE"));
    }
}
