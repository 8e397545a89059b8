//! Property-based integration tests for the portfolio pipeline.
//!
//! These tests check invariants of ledger resolution, the daily metrics,
//! allocation rollups and the delta merge over generated ledgers and price
//! series, using `proptest` for case generation.

use chrono::{Days, NaiveDate};
use finboard_core::budget::{Expense, Income};
use finboard_core::ledger::{resolve_holdings, Ledger, Security, TradeAction, Transaction};
use finboard_core::pipeline::{run_pipeline, PipelineInputs};
use finboard_core::refresh::{merge, SeriesRow};
use finboard_core::{
    compute, join, rollup, snapshot, ClassificationIndex, CompanyProfile, GroupBy,
    PriceObservation,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;

// =============================================================================
// Generators
// =============================================================================

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn day(offset: u64) -> NaiveDate {
    base_date().checked_add_days(Days::new(offset)).unwrap()
}

/// A price between $0.01 and $1,000.00.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1u32..=500).prop_map(Decimal::from)
}

/// A valid purchase history: buys of any size and sells that never exceed
/// the shares held. `sell_all` steps liquidate the whole position.
fn arb_history(security_id: &'static str) -> impl Strategy<Value = Vec<Transaction>> {
    proptest::collection::vec(
        (0u8..3, arb_quantity(), arb_price(), 0u64..3),
        1..12,
    )
    .prop_map(move |steps| {
        let mut held = Decimal::ZERO;
        let mut offset = 0;
        let mut history = Vec::new();
        for (kind, quantity, price, gap) in steps {
            offset += gap;
            let (action, quantity) = match kind {
                0 if held > Decimal::ZERO => (TradeAction::Sell, quantity.min(held)),
                1 if held > Decimal::ZERO => (TradeAction::Sell, held),
                _ => (TradeAction::Buy, quantity),
            };
            held += quantity * action.sign();
            history.push(Transaction {
                date: day(offset),
                security_id: security_id.to_string(),
                action,
                quantity,
                share_price: price,
                platform: None,
                account_type: None,
            });
        }
        history
    })
}

fn arb_ledger() -> impl Strategy<Value = Ledger> {
    (arb_history("AAA"), arb_history("BBB")).prop_map(|(a, b)| {
        Ledger::from_securities(vec![
            Security {
                security_id: "AAA".to_string(),
                company_name: None,
                purchase_history: a,
            },
            Security {
                security_id: "BBB".to_string(),
                company_name: None,
                purchase_history: b,
            },
        ])
        .unwrap()
    })
}

/// Observations on the first `days` calendar days for both securities,
/// including zero closes.
fn arb_observations(days: usize) -> impl Strategy<Value = Vec<PriceObservation>> {
    proptest::collection::vec(
        prop_oneof![9 => arb_price(), 1 => Just(Decimal::ZERO)],
        days * 2,
    )
    .prop_map(move |closes| {
        closes
            .into_iter()
            .enumerate()
            .map(|(i, close_price)| PriceObservation {
                date: day((i / 2) as u64),
                security_id: if i % 2 == 0 { "AAA" } else { "BBB" }.to_string(),
                close_price,
            })
            .collect()
    })
}

fn inputs(ledger: Ledger, observations: Vec<PriceObservation>) -> PipelineInputs {
    PipelineInputs {
        ledger,
        ledger_warnings: Vec::new(),
        observations,
        holdings: Vec::new(),
        profiles: vec![CompanyProfile {
            symbol: "AAA".to_string(),
            sector: Some("Energy".to_string()),
            ..CompanyProfile::default()
        }],
        expenses: Vec::<Expense>::new(),
        income: Vec::<Income>::new(),
        dividend_schedules: Vec::new(),
        as_of: day(40),
        top_movers_count: 5,
    }
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A single transaction resolves to exactly its own quantity and price.
    #[test]
    fn prop_single_transaction_resolves_to_itself(quantity in arb_quantity(), price in arb_price()) {
        let security = Security {
            security_id: "AAA".to_string(),
            company_name: None,
            purchase_history: vec![Transaction {
                date: base_date(),
                security_id: "AAA".to_string(),
                action: TradeAction::Buy,
                quantity,
                share_price: price,
                platform: None,
                account_type: None,
            }],
        };
        let states = resolve_holdings(&security);
        prop_assert_eq!(states.len(), 1);
        prop_assert_eq!(states[0].shares_held, quantity);
        prop_assert_eq!(states[0].avg_cost, price);
    }

    /// Whenever the running quantity reaches zero the cost basis is zero too.
    #[test]
    fn prop_flat_position_has_no_cost(ledger in arb_ledger()) {
        for security in ledger.securities() {
            let states = resolve_holdings(security);
            prop_assert_eq!(states.len(), security.purchase_history.len());
            for state in states {
                prop_assert!(state.shares_held >= Decimal::ZERO);
                if state.shares_held.is_zero() {
                    prop_assert_eq!(state.avg_cost, Decimal::ZERO);
                    prop_assert_eq!(state.equity, Decimal::ZERO);
                }
            }
        }
    }

    /// The first row of every security has no daily diff; every later row has one.
    #[test]
    fn prop_first_row_has_no_diff(ledger in arb_ledger(), observations in arb_observations(10)) {
        let joined = join(&ledger, &observations, &finboard_core::ledger::resolve_ledger(&ledger));
        let positions = compute(joined.positions);

        let mut seen = HashSet::new();
        for row in &positions {
            if seen.insert(row.security_id.clone()) {
                prop_assert!(row.daily_profit.is_none());
                prop_assert!(row.daily_pct_profit.is_none());
            } else {
                prop_assert!(row.daily_profit.is_some());
            }
        }
    }

    /// Running the pipeline twice on the same inputs gives identical output.
    #[test]
    fn prop_pipeline_is_idempotent(ledger in arb_ledger(), observations in arb_observations(15)) {
        let inputs = inputs(ledger, observations);
        let first = run_pipeline(&inputs);
        let second = run_pipeline(&inputs);

        prop_assert_eq!(
            serde_json::to_string(&first.daily_equity).unwrap(),
            serde_json::to_string(&second.daily_equity).unwrap()
        );
        prop_assert_eq!(
            serde_json::to_string(&first.snapshot).unwrap(),
            serde_json::to_string(&second.snapshot).unwrap()
        );
        prop_assert_eq!(first, second);
    }

    /// Rollup shares of a non-empty snapshot sum to one.
    #[test]
    fn prop_rollup_shares_sum_to_one(ledger in arb_ledger(), observations in arb_observations(8)) {
        let joined = join(&ledger, &observations, &finboard_core::ledger::resolve_ledger(&ledger));
        let latest = snapshot(&compute(joined.positions));
        let index = ClassificationIndex::from_tables(
            &[CompanyProfile {
                symbol: "AAA".to_string(),
                sector: Some("Energy".to_string()),
                ..CompanyProfile::default()
            }],
            &[],
        );
        let rollups = rollup(&latest, GroupBy::Sector, &index);

        if !rollups.is_empty() {
            let total: Decimal = rollups.iter().map(|r| r.pct_of_total).sum();
            prop_assert!((total - Decimal::ONE).abs() < Decimal::new(1, 20));
            let desired: Decimal = rollups.iter().map(|r| r.desired_pct).sum();
            prop_assert!((desired - Decimal::ONE).abs() < Decimal::new(1, 20));
        }
    }

    /// Merging never leaves two rows with one key, and an empty side is an identity.
    #[test]
    fn prop_merge_keys_are_unique(
        existing in arb_observations(6),
        new in arb_observations(9),
    ) {
        let merged = merge(existing.clone(), new.clone());
        let keys: HashSet<_> = merged.iter().map(|r| r.series_key()).collect();
        prop_assert_eq!(keys.len(), merged.len());

        for row in &new {
            prop_assert!(merged.contains(row));
        }
        prop_assert_eq!(merge(existing.clone(), Vec::new()), existing.clone());
        prop_assert_eq!(merge(Vec::new(), existing.clone()), existing);
    }
}
