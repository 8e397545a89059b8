//! Latest-date portfolio cross-section and top movers.

mod snapshot_builder;
mod snapshot_model;

pub use snapshot_builder::*;
pub use snapshot_model::*;
