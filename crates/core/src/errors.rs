//! Core error types for the finboard pipeline.
//!
//! Fatal failures are values of [`Error`]. Recoverable data problems are
//! reported as [`DataQualityWarning`] values alongside a successful result,
//! and numeric edge cases (full liquidation, zero previous close) are
//! absorbed where they occur and never surface as errors.

use std::path::PathBuf;

use chrono::{NaiveDate, ParseError as ChronoParseError};
use finboard_market_data::MarketDataError;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Ledger is invalid: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Refresh failed: {0}")]
    Refresh(String),

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

impl Error {
    /// Whether this error belongs to the fatal configuration class: a
    /// malformed ledger, missing credentials or an unreadable input file.
    /// These abort a refresh cycle before any computation starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Ledger(_) | Error::Configuration(_) | Error::Validation(_) | Error::Storage(_)
        )
    }
}

/// Problems found while loading or validating the transaction ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Malformed ledger document: {0}")]
    Malformed(String),

    #[error("Transaction for {security_id} on {date} has non-positive quantity {quantity}")]
    NonPositiveQuantity {
        security_id: String,
        date: NaiveDate,
        quantity: Decimal,
    },

    #[error("Transaction for {security_id} on {date} has negative share price {share_price}")]
    NegativePrice {
        security_id: String,
        date: NaiveDate,
        share_price: Decimal,
    },

    #[error("Sell of {requested} shares of {security_id} on {date} exceeds the {held} held")]
    Oversold {
        security_id: String,
        date: NaiveDate,
        held: Decimal,
        requested: Decimal,
    },
}

/// Flat-file storage failures.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Required file is missing: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date: {0}")]
    DateParse(#[from] ChronoParseError),
}

// === Data quality warnings ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// A ledger entry has no transactions.
    EmptyHistory,
    /// A ledger security has no price observations.
    MissingPriceHistory,
    /// A fundamentals or rating field could not be obtained.
    MissingFundamentals,
    /// A held security has no company profile.
    MissingProfile,
    /// An address could not be geocoded.
    GeocodingMiss,
    /// An external fetch failed for one item; its prior state was kept.
    FetchFailed,
    /// Price observations reference a security that is not in the ledger.
    UnknownSecurity,
    /// A delta refresh found no usable persisted series and ran in full.
    DeltaFallback,
}

/// A recoverable data problem. The pipeline continues and the warning is
/// returned to the caller next to the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityWarning {
    pub kind: WarningKind,
    pub security_id: Option<String>,
    pub message: String,
}

impl DataQualityWarning {
    pub fn new(kind: WarningKind, security_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            security_id: security_id.map(str::to_string),
            message: message.into(),
        }
    }

    /// Shorthand for a warning about a specific security.
    pub fn for_security(kind: WarningKind, security_id: &str, message: impl Into<String>) -> Self {
        Self::new(kind, Some(security_id), message)
    }

    /// Logs the warning at `warn` level and returns it.
    pub fn logged(self) -> Self {
        match &self.security_id {
            Some(id) => warn!("[{:?}] {}: {}", self.kind, id, self.message),
            None => warn!("[{:?}] {}", self.kind, self.message),
        }
        self
    }
}
