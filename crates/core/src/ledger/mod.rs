//! Transaction ledger and per-security holdings reconstruction.

mod ledger_model;
mod ledger_resolver;


pub use ledger_model::*;
pub use ledger_resolver::*;
