use std::collections::BTreeMap;

use log::debug;
use rust_decimal::Decimal;

use super::ledger_model::{HoldingState, Ledger, Security, TradeAction};

/// Replays a security's purchase history into one [`HoldingState`] per
/// transaction.
///
/// Average cost follows the average-cost method: a buy adds
/// `quantity × share_price` to the running cost basis, a sell relieves
/// `quantity × avg_cost` so a partial sell leaves the average cost
/// unchanged. When the running quantity returns to exactly zero the cost
/// basis and average cost reset to zero.
///
/// Several transactions on one date each produce a state; consumers keep
/// the last one for the date.
pub fn resolve_holdings(security: &Security) -> Vec<HoldingState> {
    let history = &security.purchase_history;

    if let [only] = history.as_slice() {
        return vec![HoldingState {
            date: only.date,
            shares_held: only.quantity,
            avg_cost: only.share_price,
            equity: only.quantity * only.share_price,
        }];
    }

    let mut running_quantity = Decimal::ZERO;
    let mut running_equity = Decimal::ZERO;
    let mut states = Vec::with_capacity(history.len());

    for tx in history {
        match tx.action {
            TradeAction::Buy => {
                running_quantity += tx.quantity;
                running_equity += tx.quantity * tx.share_price;
            }
            TradeAction::Sell => {
                let avg_cost_before = average_cost(running_equity, running_quantity);
                running_quantity -= tx.quantity;
                running_equity -= tx.quantity * avg_cost_before;
            }
        }

        if running_quantity.is_zero() {
            running_equity = Decimal::ZERO;
        }

        states.push(HoldingState {
            date: tx.date,
            shares_held: running_quantity,
            avg_cost: average_cost(running_equity, running_quantity),
            equity: running_equity,
        });
    }

    debug!(
        "Resolved {} holding states for {}",
        states.len(),
        security.security_id
    );
    states
}

/// Resolves every security in the ledger, keyed by security id.
pub fn resolve_ledger(ledger: &Ledger) -> BTreeMap<String, Vec<HoldingState>> {
    ledger
        .securities()
        .map(|security| (security.security_id.clone(), resolve_holdings(security)))
        .collect()
}

/// Zero when nothing is held.
fn average_cost(equity: Decimal, quantity: Decimal) -> Decimal {
    if quantity.is_zero() {
        Decimal::ZERO
    } else {
        equity / quantity
    }
}
