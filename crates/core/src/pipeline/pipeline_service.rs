use std::collections::BTreeSet;

use log::{debug, info};

use super::pipeline_model::{AllocationRollups, PipelineInputs, PipelineResult};
use crate::budget::summarize_budget;
use crate::errors::{DataQualityWarning, WarningKind};
use crate::ledger::resolve_ledger;
use crate::portfolio::allocation::{rollup, ClassificationIndex, GroupBy};
use crate::portfolio::dividends::project_dividends;
use crate::portfolio::holdings::{index_profiles, portfolio_totals, summarize_holdings};
use crate::portfolio::metrics::{aggregate, compute};
use crate::portfolio::opportunities::score_rebuys;
use crate::portfolio::positions::join;
use crate::portfolio::snapshot::{snapshot, top_movers};

/// Runs every stage over `inputs`.
///
/// Deterministic: identical inputs produce an identical result. Data
/// problems are collected in [`PipelineResult::warnings`] and never stop
/// the run.
pub fn run_pipeline(inputs: &PipelineInputs) -> PipelineResult {
    let mut warnings = inputs.ledger_warnings.clone();

    let holding_states = resolve_ledger(&inputs.ledger);
    let joined = join(&inputs.ledger, &inputs.observations, &holding_states);
    warnings.extend(joined.warnings);

    let positions = compute(joined.positions);
    let daily_equity = aggregate(&positions);
    let latest = snapshot(&positions);
    let movers = top_movers(&latest, inputs.top_movers_count);

    let profiles = index_profiles(&inputs.profiles);
    let missing_profiles: BTreeSet<&str> = latest
        .rows
        .iter()
        .map(|row| row.security_id.as_str())
        .filter(|id| !profiles.contains_key(*id))
        .collect();
    for security_id in missing_profiles {
        warnings.push(
            DataQualityWarning::for_security(
                WarningKind::MissingProfile,
                security_id,
                "no company profile; grouped under Unknown",
            )
            .logged(),
        );
    }

    let classifications = ClassificationIndex::from_tables(&inputs.profiles, &inputs.holdings);
    let rollups = AllocationRollups {
        sector: rollup(&latest, GroupBy::Sector, &classifications),
        industry: rollup(&latest, GroupBy::Industry, &classifications),
        cap_size: rollup(&latest, GroupBy::CapSize, &classifications),
        asset_type: rollup(&latest, GroupBy::AssetType, &classifications),
    };

    let holdings = summarize_holdings(&inputs.holdings);
    let totals = portfolio_totals(&holdings);
    let rebuy_opportunities = score_rebuys(&inputs.holdings, &rollups.sector, &profiles);
    let budget = summarize_budget(&inputs.expenses, &inputs.income, inputs.budget_year());
    let dividends = project_dividends(&inputs.holdings, &inputs.dividend_schedules);

    debug!(
        "Pipeline produced {} daily rows over {} dates",
        positions.len(),
        daily_equity.len()
    );
    info!(
        "Pipeline run complete: {} open positions, {} warnings",
        latest.rows.len(),
        warnings.len()
    );

    PipelineResult {
        positions,
        daily_equity,
        snapshot: latest,
        top_movers: movers,
        rollups,
        holdings,
        totals,
        rebuy_opportunities,
        budget,
        dividends,
        warnings,
    }
}
