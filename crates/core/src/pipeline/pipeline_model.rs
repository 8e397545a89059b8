use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::budget::{BudgetSummary, Expense, Income};
use crate::constants::TOP_MOVERS_COUNT;
use crate::errors::{DataQualityWarning, Result};
use crate::ledger::Ledger;
use crate::portfolio::allocation::AllocationRollup;
use crate::portfolio::dividends::{DividendProjection, DividendSchedule};
use crate::portfolio::holdings::{CompanyProfile, HoldingSummary, PortfolioTotals, StockHolding};
use crate::portfolio::metrics::DailyEquity;
use crate::portfolio::opportunities::RebuyOpportunity;
use crate::portfolio::positions::{DailyPosition, PriceObservation};
use crate::portfolio::snapshot::{PortfolioSnapshot, TopMovers};
use crate::storage::FlatFileStore;

/// Everything the pipeline reads, already parsed.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub ledger: Ledger,
    /// Problems found while loading the ledger.
    pub ledger_warnings: Vec<DataQualityWarning>,
    pub observations: Vec<PriceObservation>,
    pub holdings: Vec<StockHolding>,
    pub profiles: Vec<CompanyProfile>,
    pub expenses: Vec<Expense>,
    pub income: Vec<Income>,
    pub dividend_schedules: Vec<DividendSchedule>,
    /// Date whose calendar year the budget summary covers.
    pub as_of: NaiveDate,
    pub top_movers_count: usize,
}

impl PipelineInputs {
    /// Reads every table from `store`. Fails on a missing or malformed
    /// ledger or price series, or on any unreadable table.
    pub fn load(store: &FlatFileStore, as_of: NaiveDate) -> Result<Self> {
        let (ledger, ledger_warnings) = store.read_ledger()?;
        let observations = store
            .read_daily_stocks()?
            .iter()
            .map(|r| r.observation())
            .collect();

        Ok(Self {
            ledger,
            ledger_warnings,
            observations,
            holdings: store.read_holdings()?,
            profiles: store.read_profiles()?,
            expenses: store.read_expenses()?,
            income: store.read_income()?,
            dividend_schedules: store.read_dividends()?,
            as_of,
            top_movers_count: TOP_MOVERS_COUNT,
        })
    }

    pub fn budget_year(&self) -> i32 {
        self.as_of.year()
    }
}

/// Allocation of the latest snapshot along each classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRollups {
    pub sector: Vec<AllocationRollup>,
    pub industry: Vec<AllocationRollup>,
    pub cap_size: Vec<AllocationRollup>,
    pub asset_type: Vec<AllocationRollup>,
}

/// All derived views of one pipeline run.
///
/// Built once per refresh and handed to every consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub positions: Vec<DailyPosition>,
    pub daily_equity: Vec<DailyEquity>,
    pub snapshot: PortfolioSnapshot,
    pub top_movers: TopMovers,
    pub rollups: AllocationRollups,
    pub holdings: Vec<HoldingSummary>,
    pub totals: PortfolioTotals,
    pub rebuy_opportunities: Vec<RebuyOpportunity>,
    pub budget: BudgetSummary,
    pub dividends: Vec<DividendProjection>,
    pub warnings: Vec<DataQualityWarning>,
}

impl PipelineResult {
    /// Last date of the daily series.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.snapshot
            .as_of
            .or_else(|| self.daily_equity.last().map(|d| d.date))
    }
}
