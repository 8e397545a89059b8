use std::collections::BTreeMap;

use log::debug;
use rust_decimal::Decimal;

use super::allocation_model::{AllocationRollup, ClassificationIndex, GroupBy};
use crate::portfolio::snapshot::PortfolioSnapshot;

/// Groups the snapshot's market value by `group_by`.
///
/// Every group is measured against an even-split target of
/// `1 / group_count`. Output is sorted ascending by `pct_deviation`, so the
/// most over-allocated group comes first; ties are ordered by group key. A
/// snapshot with no market value yields no rollup.
pub fn rollup(
    snapshot: &PortfolioSnapshot,
    group_by: GroupBy,
    classifications: &ClassificationIndex,
) -> Vec<AllocationRollup> {
    let mut groups: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for row in &snapshot.rows {
        let entry = groups
            .entry(classifications.group_key(&row.security_id, group_by))
            .or_default();
        entry.0 += row.market_value;
        entry.1 += 1;
    }

    let total: Decimal = groups.values().map(|(value, _)| *value).sum();
    if groups.is_empty() || total.is_zero() {
        debug!("No market value to roll up by {}", group_by);
        return Vec::new();
    }

    let desired_pct = Decimal::ONE / Decimal::from(groups.len());
    let mut rollups: Vec<AllocationRollup> = groups
        .into_iter()
        .map(|(group_key, (market_value_sum, security_count))| {
            let pct_of_total = market_value_sum / total;
            AllocationRollup {
                group_key,
                market_value_sum,
                pct_of_total,
                desired_pct,
                pct_deviation: desired_pct - pct_of_total,
                security_count,
            }
        })
        .collect();

    rollups.sort_by(|a, b| {
        a.pct_deviation
            .cmp(&b.pct_deviation)
            .then_with(|| a.group_key.cmp(&b.group_key))
    });
    rollups
}
