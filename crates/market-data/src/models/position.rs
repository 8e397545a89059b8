use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A currently held position as reported by the brokerage.
///
/// Only `symbol`, `quantity` and `average_buy_price` are guaranteed; the rest
/// depend on what the brokerage exposes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerPosition {
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: Decimal,
    pub average_buy_price: Decimal,
    pub price: Option<Decimal>,
    /// Unrealized gain in percent, as reported by the broker.
    pub percent_change: Option<Decimal>,
    pub equity_change: Option<Decimal>,
    /// Instrument type, e.g. "stock" or "etp".
    pub asset_type: Option<String>,
}
