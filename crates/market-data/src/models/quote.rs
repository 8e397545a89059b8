use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily closing price for a symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClose {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: Decimal,
}

impl DailyClose {
    pub fn new(symbol: impl Into<String>, date: NaiveDate, close: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            close,
        }
    }
}

/// Latest trade price together with the previous session's close.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestQuote {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_trade_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,
}
