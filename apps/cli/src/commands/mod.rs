//! Command implementations.

pub mod refresh;
pub mod report;
pub mod schedule;
