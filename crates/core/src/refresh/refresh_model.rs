use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use finboard_market_data::FetchFailure;
use serde::{Deserialize, Serialize};

use crate::errors::{DataQualityWarning, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Rebuild the series from the earliest ledger transaction.
    Full,
    /// Fetch only dates after the last persisted one.
    Delta,
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshMode::Full => f.write_str("full"),
            RefreshMode::Delta => f.write_str("delta"),
        }
    }
}

impl FromStr for RefreshMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(RefreshMode::Full),
            "delta" => Ok(RefreshMode::Delta),
            other => Err(Error::Configuration(format!(
                "unknown refresh mode '{}', expected 'full' or 'delta'",
                other
            ))),
        }
    }
}

/// Date range and securities a refresh will fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPlan {
    pub requested_mode: RefreshMode,
    pub effective_mode: RefreshMode,
    /// Inclusive.
    pub start_date: NaiveDate,
    /// Inclusive; today in the valuation timezone.
    pub end_date: NaiveDate,
    pub securities: Vec<String>,
}

impl RefreshPlan {
    /// Nothing to fetch: the series already covers today.
    pub fn is_up_to_date(&self) -> bool {
        self.start_date > self.end_date || self.securities.is_empty()
    }
}

/// A security whose prices could not be refreshed. Its previously persisted
/// rows were kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFetchFailure {
    pub security_id: String,
    pub error: String,
    pub attempts: u32,
}

impl From<FetchFailure> for SecurityFetchFailure {
    fn from(failure: FetchFailure) -> Self {
        Self {
            security_id: failure.symbol,
            error: failure.error,
            attempts: failure.attempts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub requested_mode: RefreshMode,
    pub effective_mode: RefreshMode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub up_to_date: bool,
    /// Rows in the rewritten `daily_stocks.csv`; zero when nothing was written.
    pub rows_written: usize,
    /// Observations fetched in this run.
    pub rows_fetched: usize,
    pub fetched_securities: Vec<String>,
    pub failures: Vec<SecurityFetchFailure>,
    pub warnings: Vec<DataQualityWarning>,
}

impl RefreshReport {
    pub(crate) fn up_to_date(plan: &RefreshPlan, warnings: Vec<DataQualityWarning>) -> Self {
        Self {
            requested_mode: plan.requested_mode,
            effective_mode: plan.effective_mode,
            start_date: plan.start_date,
            end_date: plan.end_date,
            up_to_date: true,
            rows_written: 0,
            rows_fetched: 0,
            fetched_securities: Vec::new(),
            failures: Vec::new(),
            warnings,
        }
    }
}
