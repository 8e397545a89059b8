use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::metrics_model::DailyEquity;
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::portfolio::positions::DailyPosition;

/// Fills in every derived field of `positions`.
///
/// Rows are sorted by (security_id, date) first. `daily_profit` is the
/// change in `total_profit` against the same security's previous row and
/// `daily_pct_profit` is the percent change of `close_price`, rounded to 2
/// places. Both are `None` on a security's first row, and
/// `daily_pct_profit` is also `None` when the previous close is zero.
pub fn compute(mut positions: Vec<DailyPosition>) -> Vec<DailyPosition> {
    positions.sort_by(|a, b| {
        a.security_id
            .cmp(&b.security_id)
            .then_with(|| a.date.cmp(&b.date))
    });

    let mut previous: Option<(String, Decimal, Decimal)> = None;
    for position in positions.iter_mut() {
        position.apply_row_metrics();

        match previous.as_ref() {
            Some((security_id, prev_total_profit, prev_close))
                if *security_id == position.security_id =>
            {
                position.daily_profit = Some(position.total_profit - *prev_total_profit);
                position.daily_pct_profit = percent_change(*prev_close, position.close_price);
            }
            _ => {
                position.daily_profit = None;
                position.daily_pct_profit = None;
            }
        }

        previous = Some((
            position.security_id.clone(),
            position.total_profit,
            position.close_price,
        ));
    }

    positions
}

/// Groups positions by date into portfolio totals, ascending by date.
pub fn aggregate(positions: &[DailyPosition]) -> Vec<DailyEquity> {
    let mut totals: BTreeMap<NaiveDate, (Decimal, Decimal, Decimal)> = BTreeMap::new();
    for position in positions {
        let entry = totals.entry(position.date).or_default();
        entry.0 += position.market_value;
        entry.1 += position.equity;
        entry.2 += position.total_profit;
    }

    let mut previous_profit: Option<Decimal> = None;
    totals
        .into_iter()
        .map(|(date, (market_value, equity, total_profit))| {
            let daily_profit = previous_profit
                .map(|prev| (total_profit - prev).round_dp(DISPLAY_DECIMAL_PRECISION));
            previous_profit = Some(total_profit);
            DailyEquity {
                date,
                market_value,
                equity,
                total_profit,
                daily_profit,
            }
        })
        .collect()
}

fn percent_change(previous: Decimal, current: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    Some(((current - previous) / previous * dec!(100)).round_dp(DISPLAY_DECIMAL_PRECISION))
}
