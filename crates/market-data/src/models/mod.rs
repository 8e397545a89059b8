//! Market data models
//!
//! This module contains the data types exchanged with external providers:
//! - `quote` - Daily closing prices and latest-trade quotes (DailyClose, LatestQuote)
//! - `position` - Brokerage positions (BrokerPosition)
//! - `profile` - Fundamentals, analyst ratings and market movers
//! - `geo` - Geocoding results (GeoPoint)

mod geo;
mod position;
mod profile;
mod quote;

pub use geo::GeoPoint;
pub use position::BrokerPosition;
pub use profile::{Fundamentals, MarketMover, RatingRatios, RatingSummary};
pub use quote::{DailyClose, LatestQuote};
