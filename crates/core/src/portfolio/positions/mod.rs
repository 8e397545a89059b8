//! Daily positions: holdings forward-filled onto the price calendar.

mod positions_model;
mod price_joiner;

pub use positions_model::*;
pub use price_joiner::*;
