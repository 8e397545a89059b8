//! One pass from loaded tables to every derived view, and a fingerprint-
//! keyed cache around it.

mod pipeline_cache;
mod pipeline_model;
mod pipeline_service;

pub use pipeline_cache::*;
pub use pipeline_model::*;
pub use pipeline_service::*;
