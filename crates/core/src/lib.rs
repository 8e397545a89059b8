//! Finboard Core - Portfolio reconstruction and analytics pipeline.
//!
//! This crate turns a transaction ledger and daily closing prices into a
//! daily history of positions, portfolio-level aggregates, allocation
//! rollups and buy-opportunity rankings. External data arrives through the
//! capability traits of `finboard-market-data`; persisted state lives in
//! flat files managed by [`storage::FlatFileStore`].

pub mod budget;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod pipeline;
pub mod portfolio;
pub mod refresh;
pub mod storage;
pub mod utils;

pub use portfolio::*;

// Re-export error types
pub use errors::{DataQualityWarning, Error, Result, WarningKind};
