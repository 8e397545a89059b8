//! Allocation rollups of the latest snapshot by sector, industry, cap size
//! or asset type.

mod allocation_model;
mod rollup_builder;

pub use allocation_model::*;
pub use rollup_builder::*;
