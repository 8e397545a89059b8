pub mod allocation;
pub mod dividends;
pub mod holdings;
pub mod metrics;
pub mod opportunities;
pub mod positions;
pub mod snapshot;

pub use allocation::*;
pub use dividends::*;
pub use holdings::*;
pub use metrics::*;
pub use opportunities::*;
pub use positions::*;
pub use snapshot::*;
