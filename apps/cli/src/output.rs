//! Output formatting for refresh and report results.

use std::fmt::Write;

use finboard_core::pipeline::PipelineResult;
use finboard_core::refresh::RefreshReport;
use finboard_core::AllocationRollup;
use rust_decimal::Decimal;

use crate::cli::OutputFormat;

const TOP_ROWS: usize = 5;

pub fn print_report(result: &PipelineResult, stale: bool, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Text => print!("{}", render_report(result, stale)),
    }
    Ok(())
}

pub fn render_refresh(report: &RefreshReport) -> String {
    let mut out = String::new();
    if report.up_to_date {
        let _ = writeln!(
            out,
            "Prices already current through {} ({} refresh).",
            report.end_date, report.effective_mode
        );
    } else {
        let _ = writeln!(
            out,
            "{} refresh {} to {}: {} rows fetched for {} securities, {} rows written.",
            report.effective_mode,
            report.start_date,
            report.end_date,
            report.rows_fetched,
            report.fetched_securities.len(),
            report.rows_written
        );
    }
    if report.requested_mode != report.effective_mode {
        let _ = writeln!(
            out,
            "Requested {} refresh ran as {}.",
            report.requested_mode, report.effective_mode
        );
    }
    for failure in &report.failures {
        let _ = writeln!(
            out,
            "  failed: {} after {} attempt(s): {}",
            failure.security_id, failure.attempts, failure.error
        );
    }
    out
}

pub fn render_report(result: &PipelineResult, stale: bool) -> String {
    let mut out = String::new();

    match result.as_of() {
        Some(date) => {
            let _ = writeln!(out, "Portfolio as of {}", date);
        }
        None => {
            let _ = writeln!(out, "Portfolio (no price history)");
        }
    }
    if stale {
        let _ = writeln!(out, "(stale: the latest recompute failed, showing the last good result)");
    }

    let totals = &result.totals;
    let _ = writeln!(
        out,
        "  {} companies, market value {}, invested {}, change {} ({})",
        totals.companies,
        money(totals.market_value),
        money(totals.invested),
        money(totals.equity_change),
        pct(totals.percent_change)
    );
    if let Some(last) = result.daily_equity.last() {
        let _ = writeln!(
            out,
            "  total profit {}, day {}",
            money(last.total_profit),
            last.daily_profit.map(money).unwrap_or_else(|| "-".to_string())
        );
    }

    section(&mut out, "Top gainers");
    for mover in result.top_movers.gainers.iter().take(TOP_ROWS) {
        let _ = writeln!(
            out,
            "  {:<8} {:>12} {:>9}",
            mover.security_id,
            money(mover.daily_profit),
            pct(mover.daily_pct_profit)
        );
    }
    section(&mut out, "Top losers");
    for mover in result.top_movers.losers.iter().take(TOP_ROWS) {
        let _ = writeln!(
            out,
            "  {:<8} {:>12} {:>9}",
            mover.security_id,
            money(mover.daily_profit),
            pct(mover.daily_pct_profit)
        );
    }

    section(&mut out, "Sector allocation");
    write_rollup(&mut out, &result.rollups.sector);

    section(&mut out, "Rebuy opportunities");
    for opp in result.rebuy_opportunities.iter().take(TOP_ROWS) {
        let _ = writeln!(
            out,
            "  {:<8} score {:>6}  (market {}, sector {}, 52w {}, analysts {})",
            opp.symbol,
            opp.buy_score,
            opp.market_score,
            opp.sector_score,
            opp.highlow_score,
            opp.buyholdsell_score
        );
    }

    let budget = &result.budget;
    section(&mut out, &format!("Budget {}", budget.year));
    let _ = writeln!(
        out,
        "  income {}, expenses {}, savings {} (rate {})",
        money(budget.total_income),
        money(budget.total_expenses),
        money(budget.net_savings),
        pct(budget.savings_rate)
    );

    if !result.dividends.is_empty() {
        let annual: Decimal = result.dividends.iter().map(|d| d.annual_dividend).sum();
        section(&mut out, "Dividends");
        let _ = writeln!(
            out,
            "  projected annual {} across {} tickers",
            money(annual),
            result.dividends.len()
        );
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\n{} data quality warning(s)", result.warnings.len());
    }
    out
}

fn write_rollup(out: &mut String, rows: &[AllocationRollup]) {
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<24} {:>12} {:>8} target {:>8}",
            row.group_key,
            money(row.market_value_sum),
            pct(Some(row.pct_of_total * Decimal::ONE_HUNDRED)),
            pct(Some(row.desired_pct * Decimal::ONE_HUNDRED))
        );
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title);
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn pct(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "-".to_string(),
    }
}
