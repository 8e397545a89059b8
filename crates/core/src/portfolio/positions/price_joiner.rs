//! Joins resolved holdings onto each security's price calendar.
//!
//! For every security the join walks its price dates in order while a
//! cursor walks its holding states, carrying the last state whose date is
//! on or before the price date. Dates before the first transaction get a
//! flat (zero) holding. No rows are invented for dates without a price.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use super::positions_model::{DailyPosition, PriceObservation};
use crate::errors::{DataQualityWarning, WarningKind};
use crate::ledger::{HoldingState, Ledger};

/// Rows produced by [`join`], ordered by (security_id, date).
#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    pub positions: Vec<DailyPosition>,
    pub warnings: Vec<DataQualityWarning>,
}

/// Per-security close prices keyed by date. A later observation for the
/// same date replaces an earlier one.
pub fn index_observations(
    observations: &[PriceObservation],
) -> BTreeMap<&str, BTreeMap<NaiveDate, Decimal>> {
    let mut index: BTreeMap<&str, BTreeMap<NaiveDate, Decimal>> = BTreeMap::new();
    for obs in observations {
        index
            .entry(obs.security_id.as_str())
            .or_default()
            .insert(obs.date, obs.close_price);
    }
    index
}

pub fn join(
    ledger: &Ledger,
    observations: &[PriceObservation],
    holding_states: &BTreeMap<String, Vec<HoldingState>>,
) -> JoinOutcome {
    let prices = index_observations(observations);
    let mut outcome = JoinOutcome::default();

    let unknown: BTreeSet<&str> = prices
        .keys()
        .copied()
        .filter(|id| !ledger.contains(id))
        .collect();
    for security_id in unknown {
        outcome.warnings.push(
            DataQualityWarning::for_security(
                WarningKind::UnknownSecurity,
                security_id,
                "price observations ignored: security is not in the ledger",
            )
            .logged(),
        );
    }

    let no_states: Vec<HoldingState> = Vec::new();
    for security_id in ledger.security_ids() {
        let Some(calendar) = prices.get(security_id) else {
            outcome.warnings.push(
                DataQualityWarning::for_security(
                    WarningKind::MissingPriceHistory,
                    security_id,
                    "no price observations; security excluded from daily positions",
                )
                .logged(),
            );
            continue;
        };

        let states = holding_states.get(security_id).unwrap_or(&no_states);
        let rows_before = outcome.positions.len();
        forward_fill(security_id, calendar, states, &mut outcome.positions);
        debug!(
            "Joined {} daily rows for {}",
            outcome.positions.len() - rows_before,
            security_id
        );
    }

    outcome
}

/// Walks `calendar` and `states` together, emitting one row per price date.
fn forward_fill(
    security_id: &str,
    calendar: &BTreeMap<NaiveDate, Decimal>,
    states: &[HoldingState],
    out: &mut Vec<DailyPosition>,
) {
    let mut cursor = 0;
    let mut current: Option<&HoldingState> = None;

    for (&date, &close) in calendar {
        while let Some(state) = states.get(cursor) {
            if state.date > date {
                break;
            }
            current = Some(state);
            cursor += 1;
        }

        let row = match current {
            Some(state) => DailyPosition::new(date, security_id, close, state),
            None => DailyPosition::new(date, security_id, close, &HoldingState::flat(date)),
        };
        out.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{resolve_ledger, Security, TradeAction, Transaction};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn tx(id: &str, d: u32, action: TradeAction, qty: Decimal, price: Decimal) -> Transaction {
        Transaction {
            date: day(d),
            security_id: id.to_string(),
            action,
            quantity: qty,
            share_price: price,
            platform: None,
            account_type: None,
        }
    }

    fn obs(id: &str, d: u32, close: Decimal) -> PriceObservation {
        PriceObservation {
            date: day(d),
            security_id: id.to_string(),
            close_price: close,
        }
    }

    fn ledger(securities: Vec<(&str, Vec<Transaction>)>) -> Ledger {
        Ledger::from_securities(securities.into_iter().map(|(id, history)| Security {
            security_id: id.to_string(),
            company_name: None,
            purchase_history: history,
        }))
        .unwrap()
    }

    #[test]
    fn test_forward_fill_carries_last_state() {
        let ledger = ledger(vec![(
            "A",
            vec![
                tx("A", 1, TradeAction::Buy, dec!(10), dec!(100)),
                tx("A", 3, TradeAction::Sell, dec!(4), dec!(120)),
            ],
        )]);
        let prices = vec![
            obs("A", 1, dec!(100)),
            obs("A", 2, dec!(110)),
            obs("A", 3, dec!(130)),
            obs("A", 4, dec!(125)),
        ];

        let outcome = join(&ledger, &prices, &resolve_ledger(&ledger));
        let shares: Vec<Decimal> = outcome.positions.iter().map(|p| p.shares_held).collect();
        assert_eq!(shares, vec![dec!(10), dec!(10), dec!(6), dec!(6)]);

        let day3 = &outcome.positions[2];
        assert_eq!(day3.avg_cost, dec!(100));
        assert_eq!(day3.equity, dec!(600));
        assert_eq!(day3.market_value, dec!(780));
        assert_eq!(day3.total_profit, dec!(180));
        assert_eq!(day3.per_share_profit, dec!(30));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_dates_before_first_transaction_are_flat() {
        let ledger = ledger(vec![(
            "A",
            vec![tx("A", 3, TradeAction::Buy, dec!(2), dec!(50))],
        )]);
        let prices = vec![obs("A", 2, dec!(48)), obs("A", 3, dec!(51))];

        let outcome = join(&ledger, &prices, &resolve_ledger(&ledger));
        assert_eq!(outcome.positions[0].shares_held, Decimal::ZERO);
        assert_eq!(outcome.positions[0].market_value, Decimal::ZERO);
        assert_eq!(outcome.positions[0].total_profit, Decimal::ZERO);
        assert_eq!(outcome.positions[1].shares_held, dec!(2));
    }

    #[test]
    fn test_off_calendar_transaction_applies_from_next_trading_date() {
        // Bought on a Saturday (Jan 6); first price after that is Monday (Jan 8).
        let ledger = ledger(vec![(
            "A",
            vec![tx("A", 6, TradeAction::Buy, dec!(1), dec!(10))],
        )]);
        let prices = vec![obs("A", 5, dec!(9)), obs("A", 8, dec!(11))];

        let outcome = join(&ledger, &prices, &resolve_ledger(&ledger));
        assert_eq!(outcome.positions.len(), 2);
        assert_eq!(outcome.positions[0].shares_held, Decimal::ZERO);
        assert_eq!(outcome.positions[1].shares_held, dec!(1));
    }

    #[test]
    fn test_liquidated_security_stays_flat() {
        let ledger = ledger(vec![(
            "B",
            vec![
                tx("B", 1, TradeAction::Buy, dec!(3), dec!(20)),
                tx("B", 3, TradeAction::Sell, dec!(3), dec!(25)),
            ],
        )]);
        let prices: Vec<_> = (1..=5).map(|d| obs("B", d, dec!(24))).collect();

        let outcome = join(&ledger, &prices, &resolve_ledger(&ledger));
        for row in &outcome.positions[2..] {
            assert_eq!(row.shares_held, Decimal::ZERO);
            assert_eq!(row.avg_cost, Decimal::ZERO);
            assert_eq!(row.equity, Decimal::ZERO);
            assert_eq!(row.market_value, Decimal::ZERO);
        }
    }

    #[test]
    fn test_missing_prices_and_unknown_securities_warn() {
        let ledger = ledger(vec![
            ("A", vec![tx("A", 1, TradeAction::Buy, dec!(1), dec!(10))]),
            ("B", vec![tx("B", 1, TradeAction::Buy, dec!(1), dec!(10))]),
        ]);
        let prices = vec![obs("A", 1, dec!(10)), obs("ZZZ", 1, dec!(1))];

        let outcome = join(&ledger, &prices, &resolve_ledger(&ledger));
        assert_eq!(outcome.positions.len(), 1);
        let kinds: Vec<_> = outcome
            .warnings
            .iter()
            .map(|w| (w.kind, w.security_id.clone().unwrap()))
            .collect();
        assert!(kinds.contains(&(WarningKind::UnknownSecurity, "ZZZ".to_string())));
        assert!(kinds.contains(&(WarningKind::MissingPriceHistory, "B".to_string())));
    }

    #[test]
    fn test_duplicate_observation_keeps_last() {
        let ledger = ledger(vec![(
            "A",
            vec![tx("A", 1, TradeAction::Buy, dec!(1), dec!(10))],
        )]);
        let prices = vec![obs("A", 1, dec!(10)), obs("A", 1, dec!(12))];

        let outcome = join(&ledger, &prices, &resolve_ledger(&ledger));
        assert_eq!(outcome.positions.len(), 1);
        assert_eq!(outcome.positions[0].close_price, dec!(12));
    }
}
