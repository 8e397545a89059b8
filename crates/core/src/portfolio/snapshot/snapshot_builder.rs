use std::cmp::Ordering;

use log::debug;
use rust_decimal::Decimal;

use super::snapshot_model::{Mover, PortfolioSnapshot, TopMovers};
use crate::constants::PLACEHOLDER_SECURITY_ID;
use crate::portfolio::positions::DailyPosition;

/// Rows at the latest date that hold shares, excluding placeholder rows.
/// Output is ordered by security id.
pub fn snapshot(positions: &[DailyPosition]) -> PortfolioSnapshot {
    let Some(as_of) = positions.iter().map(|p| p.date).max() else {
        return PortfolioSnapshot::default();
    };

    let mut rows: Vec<DailyPosition> = positions
        .iter()
        .filter(|p| p.date == as_of)
        .filter(|p| !p.shares_held.is_zero())
        .filter(|p| !is_placeholder(&p.security_id))
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.security_id.cmp(&b.security_id));

    debug!("Snapshot as of {} has {} open positions", as_of, rows.len());
    PortfolioSnapshot {
        as_of: Some(as_of),
        rows,
    }
}

/// Up to `n` gainers (`daily_profit > 0`, descending) and losers
/// (`daily_profit < 0`, ascending). Rows with zero or unknown daily profit
/// appear in neither list. Ties are ordered by security id.
pub fn top_movers(snapshot: &PortfolioSnapshot, n: usize) -> TopMovers {
    let movers: Vec<Mover> = snapshot
        .rows
        .iter()
        .filter_map(|row| {
            row.daily_profit.map(|daily_profit| Mover {
                security_id: row.security_id.clone(),
                daily_profit,
                daily_pct_profit: row.daily_pct_profit,
            })
        })
        .collect();

    let mut gainers: Vec<Mover> = movers
        .iter()
        .filter(|m| m.daily_profit > Decimal::ZERO)
        .cloned()
        .collect();
    gainers.sort_by(|a, b| by_profit(b, a).then_with(|| a.security_id.cmp(&b.security_id)));
    gainers.truncate(n);

    let mut losers: Vec<Mover> = movers
        .into_iter()
        .filter(|m| m.daily_profit < Decimal::ZERO)
        .collect();
    losers.sort_by(|a, b| by_profit(a, b).then_with(|| a.security_id.cmp(&b.security_id)));
    losers.truncate(n);

    TopMovers { gainers, losers }
}

fn by_profit(a: &Mover, b: &Mover) -> Ordering {
    a.daily_profit.cmp(&b.daily_profit)
}

fn is_placeholder(security_id: &str) -> bool {
    let trimmed = security_id.trim();
    trimmed.is_empty() || trimmed == PLACEHOLDER_SECURITY_ID
}
