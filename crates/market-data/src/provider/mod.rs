//! Provider capability traits and implementations.
//!
//! This module contains:
//! - The three capability traits the pipeline consumes
//!   ([`HoldingsProvider`], [`PriceHistoryProvider`], [`GeocodingProvider`])
//! - Concrete implementations for Yahoo Finance price history and the
//!   Nominatim geocoder
//!
//! The brokerage side ([`HoldingsProvider`]) ships without a concrete
//! implementation; callers inject their own.

mod traits;

pub mod nominatim;
pub mod yahoo;

pub use traits::{GeocodingProvider, HoldingsProvider, PriceHistoryProvider};
