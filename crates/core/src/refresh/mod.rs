//! Price refresh: plan the date range, download closes, merge them into
//! the persisted series and rebuild the derived columns.

mod delta_merge;
mod refresh_model;
mod refresh_service;

pub use delta_merge::*;
pub use refresh_model::*;
pub use refresh_service::*;
