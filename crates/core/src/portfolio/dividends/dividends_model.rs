use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How often a security pays. Unrecognized values are treated as annual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    #[serde(other)]
    Annual,
}

impl PaymentFrequency {
    pub fn payments_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Annual => 1,
        }
    }
}

/// One row of `dividends.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendSchedule {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Dividend Yield (%)")]
    pub dividend_yield_pct: Decimal,
    #[serde(rename = "Frequency")]
    pub frequency: PaymentFrequency,
    #[serde(rename = "Last Payment Date", default, with = "crate::utils::date_format::option")]
    pub last_payment_date: Option<NaiveDate>,
    #[serde(rename = "Amount Paid", default)]
    pub amount_paid: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendProjection {
    pub ticker: String,
    pub market_value: Decimal,
    pub dividend_yield_pct: Decimal,
    pub frequency: PaymentFrequency,
    pub last_payment_date: Option<NaiveDate>,
    pub amount_paid: Option<Decimal>,
    /// `market_value × yield / 100`.
    pub annual_dividend: Decimal,
    pub projected_per_payment: Decimal,
}
