//! Diff-based per-security metrics and portfolio-level daily aggregates.

mod metrics_calculator;
mod metrics_model;

pub use metrics_calculator::*;
pub use metrics_model::*;
