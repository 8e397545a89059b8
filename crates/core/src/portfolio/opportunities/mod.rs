//! Buy opportunities: scored rebuys of held securities and unscored
//! new-buy candidates from the market's top movers.

mod new_buy_service;
mod opportunities_model;
mod rebuy_scorer;


pub use new_buy_service::*;
pub use opportunities_model::*;
pub use rebuy_scorer::*;
