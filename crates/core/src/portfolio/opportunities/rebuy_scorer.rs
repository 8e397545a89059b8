//! Composite rebuy score for held securities.
//!
//! Ranks put the largest value at rank 1 and scale linearly against the
//! highest rank, so the most concentrated positions and sectors earn the
//! smallest market and sector scores.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use rust_decimal::Decimal;

use super::opportunities_model::RebuyOpportunity;
use crate::constants::{
    ANALYST_SCORE_WEIGHT, DISPLAY_DECIMAL_PRECISION, HIGHLOW_SCORE_WEIGHT, MARKET_SCORE_WEIGHT,
    SECTOR_SCORE_WEIGHT, UNKNOWN_GROUP,
};
use crate::portfolio::allocation::AllocationRollup;
use crate::portfolio::holdings::{CompanyProfile, StockHolding};

/// Scores every held security (quantity > 0) and sorts by `buy_score`
/// descending, ties by ticker.
///
/// `sector_rollup` supplies each sector's total value; `profiles` supplies
/// sector membership and analyst ratios. Any missing input makes its
/// component contribute zero.
pub fn score_rebuys(
    holdings: &[StockHolding],
    sector_rollup: &[AllocationRollup],
    profiles: &BTreeMap<String, CompanyProfile>,
) -> Vec<RebuyOpportunity> {
    let candidates: Vec<&StockHolding> = holdings
        .iter()
        .filter(|h| h.quantity > Decimal::ZERO)
        .collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let sector_values: BTreeMap<&str, Decimal> = sector_rollup
        .iter()
        .map(|r| (r.group_key.as_str(), r.market_value_sum))
        .collect();
    let sectors: Vec<String> = candidates
        .iter()
        .map(|h| sector_of(profiles.get(h.symbol.as_str())))
        .collect();
    let candidate_sector_values: Vec<Option<Decimal>> = sectors
        .iter()
        .map(|s| sector_values.get(s.as_str()).copied())
        .collect();

    let market_values: Vec<Decimal> = candidates.iter().map(|h| h.market_value).collect();
    let market_ranks = average_rank_desc(&market_values);
    let sector_ranks = dense_rank_desc(&candidate_sector_values);
    let max_market_rank = market_ranks.iter().copied().max().unwrap_or(Decimal::ZERO);
    let max_sector_rank = sector_ranks.iter().flatten().copied().max().unwrap_or(Decimal::ZERO);

    let mut scored: Vec<RebuyOpportunity> = candidates
        .iter()
        .zip(sectors)
        .enumerate()
        .map(|(i, (holding, sector))| {
            let profile = profiles.get(holding.symbol.as_str());
            let buy_ratio = profile.and_then(|p| p.buy_ratio);
            let sell_ratio = profile.and_then(|p| p.sell_ratio);

            let market_score =
                scaled_rank(Some(market_ranks[i]), max_market_rank, MARKET_SCORE_WEIGHT);
            let sector_score = scaled_rank(sector_ranks[i], max_sector_rank, SECTOR_SCORE_WEIGHT);
            let highlow_score =
                highlow_score(holding.price, holding.high_52_week, holding.low_52_week);
            let buyholdsell_score = analyst_score(buy_ratio, sell_ratio);

            RebuyOpportunity {
                symbol: holding.symbol.clone(),
                company: holding.company.clone(),
                sector,
                price: holding.price,
                market_value: holding.market_value,
                high_52_week: holding.high_52_week,
                low_52_week: holding.low_52_week,
                buy_ratio,
                sell_ratio,
                market_score,
                sector_score,
                highlow_score,
                buyholdsell_score,
                buy_score: market_score + sector_score + highlow_score + buyholdsell_score,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.buy_score
            .cmp(&a.buy_score)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    debug!("Scored {} rebuy candidates", scored.len());
    scored
}

fn sector_of(profile: Option<&CompanyProfile>) -> String {
    profile
        .and_then(|p| p.sector.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_GROUP)
        .to_string()
}

/// 1-based rank, largest value first; equal values share the mean of the
/// positions they occupy.
fn average_rank_desc(values: &[Decimal]) -> Vec<Decimal> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].cmp(&values[a]));

    let mut ranks = vec![Decimal::ZERO; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // positions start..=end are 1-based start+1..=end+1
        let rank = Decimal::from(start + end + 2) / Decimal::TWO;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }
    ranks
}

/// 1-based dense rank, largest value first. Missing values stay unranked.
fn dense_rank_desc(values: &[Option<Decimal>]) -> Vec<Option<Decimal>> {
    let distinct: BTreeSet<Decimal> = values.iter().flatten().copied().collect();
    let descending: Vec<Decimal> = distinct.into_iter().rev().collect();
    values
        .iter()
        .map(|value| {
            value.and_then(|v| {
                descending
                    .iter()
                    .position(|d| *d == v)
                    .map(|pos| Decimal::from(pos + 1))
            })
        })
        .collect()
}

fn scaled_rank(rank: Option<Decimal>, max_rank: Decimal, weight: i64) -> Decimal {
    match rank {
        Some(rank) if !max_rank.is_zero() => {
            clamp_score(rank * Decimal::from(weight) / max_rank, weight)
        }
        _ => Decimal::ZERO,
    }
}

/// `|1 - (price - low) / (high - low)| × 30`; zero when the range is
/// unknown or empty.
fn highlow_score(price: Decimal, high: Option<Decimal>, low: Option<Decimal>) -> Decimal {
    match (high, low) {
        (Some(high), Some(low)) if high > low => {
            let position = (price - low) / (high - low);
            let distance = (Decimal::ONE - position).abs();
            clamp_score(distance * Decimal::from(HIGHLOW_SCORE_WEIGHT), HIGHLOW_SCORE_WEIGHT)
        }
        _ => Decimal::ZERO,
    }
}

fn analyst_score(buy_ratio: Option<Decimal>, sell_ratio: Option<Decimal>) -> Decimal {
    match (buy_ratio, sell_ratio) {
        (Some(buy), Some(sell)) => clamp_score(
            (buy - sell) * Decimal::from(ANALYST_SCORE_WEIGHT),
            ANALYST_SCORE_WEIGHT,
        ),
        _ => Decimal::ZERO,
    }
}

fn clamp_score(value: Decimal, max: i64) -> Decimal {
    value
        .round_dp(DISPLAY_DECIMAL_PRECISION)
        .clamp(Decimal::ZERO, Decimal::from(max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::allocation::AllocationRollup;
    use rust_decimal_macros::dec;

    fn holding(symbol: &str, market_value: Decimal, price: Decimal) -> StockHolding {
        StockHolding {
            symbol: symbol.to_string(),
            company: None,
            price,
            quantity: Decimal::ONE,
            avg_cost: price,
            market_value,
            percent_change: None,
            equity_change: None,
            high_52_week: None,
            low_52_week: None,
            asset_type: None,
        }
    }

    fn profile(symbol: &str, sector: &str) -> (String, CompanyProfile) {
        (
            symbol.to_string(),
            CompanyProfile {
                symbol: symbol.to_string(),
                sector: Some(sector.to_string()),
                ..CompanyProfile::default()
            },
        )
    }

    fn sector(key: &str, value: Decimal) -> AllocationRollup {
        AllocationRollup {
            group_key: key.to_string(),
            market_value_sum: value,
            pct_of_total: Decimal::ZERO,
            desired_pct: Decimal::ZERO,
            pct_deviation: Decimal::ZERO,
            security_count: 1,
        }
    }

    #[test]
    fn test_average_rank_shares_ties() {
        let ranks = average_rank_desc(&[dec!(10), dec!(30), dec!(10), dec!(5)]);
        assert_eq!(ranks, vec![dec!(2.5), dec!(1), dec!(2.5), dec!(4)]);
    }

    #[test]
    fn test_dense_rank_skips_missing() {
        let ranks = dense_rank_desc(&[Some(dec!(7)), None, Some(dec!(9)), Some(dec!(7))]);
        assert_eq!(
            ranks,
            vec![Some(dec!(2)), None, Some(dec!(1)), Some(dec!(2))]
        );
    }

    #[test]
    fn test_larger_positions_score_lower() {
        let holdings = vec![
            holding("BIG", dec!(9000), dec!(10)),
            holding("MID", dec!(3000), dec!(10)),
            holding("SMALL", dec!(1000), dec!(10)),
        ];
        let profiles: BTreeMap<_, _> = vec![
            profile("BIG", "Technology"),
            profile("MID", "Technology"),
            profile("SMALL", "Energy"),
        ]
        .into_iter()
        .collect();
        let rollup = vec![sector("Technology", dec!(12000)), sector("Energy", dec!(1000))];

        let scored = score_rebuys(&holdings, &rollup, &profiles);
        let symbols: Vec<&str> = scored.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SMALL", "MID", "BIG"]);

        let small = &scored[0];
        assert_eq!(small.market_score, dec!(20));
        assert_eq!(small.sector_score, dec!(20));
        assert_eq!(small.buy_score, dec!(40));

        let mid = &scored[1];
        assert_eq!(mid.market_score, dec!(13.33));
        assert_eq!(mid.sector_score, dec!(10));

        let big = &scored[2];
        assert_eq!(big.market_score, dec!(6.67));
        assert_eq!(big.sector_score, dec!(10));
    }

    #[test]
    fn test_highlow_and_analyst_components() {
        let mut near_low = holding("LOW", dec!(100), dec!(55));
        near_low.high_52_week = Some(dec!(150));
        near_low.low_52_week = Some(dec!(50));
        let profile = CompanyProfile {
            symbol: "LOW".to_string(),
            sector: Some("Health Technology".to_string()),
            buy_ratio: Some(dec!(0.7)),
            hold_ratio: Some(dec!(0.2)),
            sell_ratio: Some(dec!(0.1)),
            ..CompanyProfile::default()
        };
        let profiles: BTreeMap<_, _> = vec![("LOW".to_string(), profile)].into_iter().collect();

        let scored = score_rebuys(&[near_low], &[], &profiles);
        let only = &scored[0];
        assert_eq!(only.highlow_score, dec!(28.5));
        assert_eq!(only.buyholdsell_score, dec!(18));
        // no rollup entry for the sector
        assert_eq!(only.sector_score, Decimal::ZERO);
        assert_eq!(only.market_score, dec!(20));
        assert_eq!(only.buy_score, dec!(66.5));
    }

    #[test]
    fn test_components_are_clamped() {
        let mut below_low = holding("X", dec!(100), dec!(40));
        below_low.high_52_week = Some(dec!(150));
        below_low.low_52_week = Some(dec!(50));
        let profiles: BTreeMap<_, _> = vec![(
            "X".to_string(),
            CompanyProfile {
                symbol: "X".to_string(),
                buy_ratio: Some(dec!(0.1)),
                sell_ratio: Some(dec!(0.6)),
                ..CompanyProfile::default()
            },
        )]
        .into_iter()
        .collect();

        let scored = score_rebuys(&[below_low], &[], &profiles);
        assert_eq!(scored[0].highlow_score, dec!(30));
        assert_eq!(scored[0].buyholdsell_score, Decimal::ZERO);
        assert_eq!(scored[0].sector, UNKNOWN_GROUP);
        assert!(scored[0].buy_score <= dec!(100));
    }

    #[test]
    fn test_missing_inputs_contribute_zero_and_sold_out_is_skipped() {
        let mut sold = holding("GONE", dec!(0), dec!(10));
        sold.quantity = Decimal::ZERO;
        let holdings = vec![holding("A", dec!(100), dec!(10)), sold];

        let scored = score_rebuys(&holdings, &[], &BTreeMap::new());
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].highlow_score, Decimal::ZERO);
        assert_eq!(scored[0].buyholdsell_score, Decimal::ZERO);
        assert_eq!(scored[0].buy_score, dec!(20));
    }

    #[test]
    fn test_equal_scores_order_by_ticker() {
        let holdings = vec![
            holding("ZED", dec!(100), dec!(10)),
            holding("ABC", dec!(100), dec!(10)),
        ];
        let scored = score_rebuys(&holdings, &[], &BTreeMap::new());
        assert_eq!(scored[0].symbol, "ABC");
        assert_eq!(scored[0].buy_score, scored[1].buy_score);
    }
}
