//! Household budget: yearly income and expense analytics.

mod budget_model;
mod budget_service;

pub use budget_model::*;
pub use budget_service::*;
