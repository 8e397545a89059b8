//! Flat-file persistence under a single data directory.

mod flat_file_store;


pub use flat_file_store::*;
