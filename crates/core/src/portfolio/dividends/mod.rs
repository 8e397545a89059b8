//! Dividend tracking: projected payments for held dividend payers.

mod dividends_model;
mod dividends_service;

pub use dividends_model::*;
pub use dividends_service::*;
