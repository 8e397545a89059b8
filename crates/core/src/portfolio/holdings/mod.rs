//! Current holdings table (`stocks.csv`), company profiles (`stock_info.csv`)
//! and their refresh from the brokerage.

mod holdings_model;
mod holdings_refresh_service;
mod holdings_service;

pub use holdings_model::*;
pub use holdings_refresh_service::*;
pub use holdings_service::*;
