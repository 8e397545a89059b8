use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use finboard_market_data::{PriceFetcher, PriceRequest};
use log::{info, warn};

use super::delta_merge::merge;
use super::refresh_model::{RefreshMode, RefreshPlan, RefreshReport, SecurityFetchFailure};
use crate::constants::DAILY_STOCKS_FILE;
use crate::errors::{DataQualityWarning, Error, Result, WarningKind};
use crate::ledger::{resolve_ledger, Ledger};
use crate::portfolio::metrics::compute;
use crate::portfolio::positions::{join, DailyStockRecord, PriceObservation};
use crate::storage::FlatFileStore;
use crate::utils::time_utils::{next_day, valuation_date_today};

#[async_trait]
pub trait RefreshServiceTrait: Send + Sync {
    /// Brings `daily_stocks.csv` up to date and rewrites its derived columns.
    async fn refresh(&self, mode: RefreshMode) -> Result<RefreshReport>;
}

pub struct RefreshService {
    store: FlatFileStore,
    fetcher: Arc<PriceFetcher>,
    today: Option<NaiveDate>,
}

impl RefreshService {
    pub fn new(store: FlatFileStore, fetcher: Arc<PriceFetcher>) -> Self {
        Self {
            store,
            fetcher,
            today: None,
        }
    }

    /// Pins "today" instead of reading the clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(valuation_date_today)
    }

    /// Reads the persisted series. In delta mode an unusable series turns
    /// the refresh into a full one.
    fn load_existing(
        &self,
        mode: RefreshMode,
        warnings: &mut Vec<DataQualityWarning>,
    ) -> (RefreshMode, Vec<DailyStockRecord>) {
        match (mode, self.store.read_daily_stocks()) {
            (RefreshMode::Delta, Ok(rows)) if !rows.is_empty() => (RefreshMode::Delta, rows),
            (RefreshMode::Delta, Ok(_)) => {
                warnings.push(
                    DataQualityWarning::new(
                        WarningKind::DeltaFallback,
                        None,
                        "persisted series is empty; running a full refresh",
                    )
                    .logged(),
                );
                (RefreshMode::Full, Vec::new())
            }
            (RefreshMode::Delta, Err(e)) => {
                warnings.push(
                    DataQualityWarning::new(
                        WarningKind::DeltaFallback,
                        None,
                        format!("persisted series unusable ({}); running a full refresh", e),
                    )
                    .logged(),
                );
                (RefreshMode::Full, Vec::new())
            }
            (RefreshMode::Full, Ok(rows)) => (RefreshMode::Full, rows),
            (RefreshMode::Full, Err(e)) => {
                info!("No prior series to fall back on: {}", e);
                (RefreshMode::Full, Vec::new())
            }
        }
    }
}

/// Works out the fetch range.
///
/// A full refresh starts at the earliest ledger transaction; a delta
/// refresh starts the day after the latest persisted date. Both end today.
pub fn plan_refresh(
    ledger: &Ledger,
    existing: &[DailyStockRecord],
    requested_mode: RefreshMode,
    effective_mode: RefreshMode,
    today: NaiveDate,
) -> RefreshPlan {
    let start_date = match effective_mode {
        RefreshMode::Full => ledger.earliest_transaction_date(),
        RefreshMode::Delta => existing.iter().map(|r| r.date).max().map(next_day),
    }
    .unwrap_or_else(|| next_day(today));

    RefreshPlan {
        requested_mode,
        effective_mode,
        start_date,
        end_date: today,
        securities: ledger.security_ids().map(str::to_string).collect(),
    }
}

#[async_trait]
impl RefreshServiceTrait for RefreshService {
    async fn refresh(&self, mode: RefreshMode) -> Result<RefreshReport> {
        let (ledger, mut warnings) = self.store.read_ledger()?;
        let (effective_mode, existing) = self.load_existing(mode, &mut warnings);
        let plan = plan_refresh(&ledger, &existing, mode, effective_mode, self.today());

        if plan.is_up_to_date() {
            info!(
                "Price series already current through {} ({} refresh)",
                plan.end_date, plan.effective_mode
            );
            return Ok(RefreshReport::up_to_date(&plan, warnings));
        }

        info!(
            "Starting {} price refresh of {} securities from {} to {} via {}",
            plan.effective_mode,
            plan.securities.len(),
            plan.start_date,
            plan.end_date,
            self.fetcher.provider_id()
        );

        let requests: Vec<PriceRequest> = plan
            .securities
            .iter()
            .map(|symbol| PriceRequest {
                symbol: symbol.clone(),
                start: plan.start_date,
                end: plan.end_date,
            })
            .collect();
        let outcome = self.fetcher.fetch_all(&requests).await;

        let rows_fetched: usize = outcome.prices.values().map(Vec::len).sum();
        if rows_fetched == 0 {
            if plan.effective_mode == RefreshMode::Delta && outcome.failures.is_empty() {
                info!(
                    "No closes published since {}; series left as is",
                    plan.start_date
                );
                return Ok(RefreshReport::up_to_date(&plan, warnings));
            }
            return Err(Error::Refresh(format!(
                "{} refresh returned no prices for any of {} securities ({} failed); {} left untouched",
                plan.effective_mode,
                plan.securities.len(),
                outcome.failures.len(),
                self.store.path(DAILY_STOCKS_FILE).display()
            )));
        }

        let mut failures: Vec<SecurityFetchFailure> = outcome
            .failures
            .into_iter()
            .map(SecurityFetchFailure::from)
            .collect();
        // A full refresh replaces every security's rows, so an empty answer
        // must not erase the history already on disk.
        if plan.effective_mode == RefreshMode::Full {
            failures.extend(
                outcome
                    .prices
                    .iter()
                    .filter(|(_, closes)| closes.is_empty())
                    .map(|(symbol, _)| SecurityFetchFailure {
                        security_id: symbol.clone(),
                        error: format!(
                            "no closes between {} and {}",
                            plan.start_date, plan.end_date
                        ),
                        attempts: 1,
                    }),
            );
        }

        let failed: BTreeSet<&str> = failures.iter().map(|f| f.security_id.as_str()).collect();
        for failure in &failures {
            warnings.push(
                DataQualityWarning::for_security(
                    WarningKind::FetchFailed,
                    &failure.security_id,
                    format!("price refresh failed, prior rows kept: {}", failure.error),
                )
                .logged(),
            );
        }

        // Delta keeps the whole persisted series; full keeps only what the
        // failed securities had.
        let carried: Vec<PriceObservation> = existing
            .iter()
            .filter(|r| {
                plan.effective_mode == RefreshMode::Delta || failed.contains(r.stock.as_str())
            })
            .map(DailyStockRecord::observation)
            .collect();
        let fetched: Vec<PriceObservation> = outcome
            .prices
            .values()
            .flatten()
            .map(|close| PriceObservation {
                date: close.date,
                security_id: close.symbol.clone(),
                close_price: close.close,
            })
            .collect();
        let observations = merge(carried, fetched);

        let joined = join(&ledger, &observations, &resolve_ledger(&ledger));
        warnings.extend(joined.warnings);
        let positions = compute(joined.positions);
        let records: Vec<DailyStockRecord> = positions.iter().map(DailyStockRecord::from).collect();

        self.store.write_daily_stocks(&records)?;

        if !failures.is_empty() {
            warn!(
                "{} of {} securities failed to refresh",
                failures.len(),
                plan.securities.len()
            );
        }
        info!(
            "{} refresh wrote {} rows ({} fetched)",
            plan.effective_mode,
            records.len(),
            rows_fetched
        );

        Ok(RefreshReport {
            requested_mode: plan.requested_mode,
            effective_mode: plan.effective_mode,
            start_date: plan.start_date,
            end_date: plan.end_date,
            up_to_date: false,
            rows_written: records.len(),
            rows_fetched,
            fetched_securities: outcome
                .prices
                .iter()
                .filter(|(_, closes)| !closes.is_empty())
                .map(|(symbol, _)| symbol.clone())
                .collect(),
            failures,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Security, TradeAction, Transaction};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn ledger() -> Ledger {
        let buy = |id: &str, d: u32| Security {
            security_id: id.to_string(),
            company_name: None,
            purchase_history: vec![Transaction {
                date: day(d),
                security_id: id.to_string(),
                action: TradeAction::Buy,
                quantity: dec!(1),
                share_price: dec!(10),
                platform: None,
                account_type: None,
            }],
        };
        Ledger::from_securities(vec![buy("B", 4), buy("A", 6)]).unwrap()
    }

    fn record(d: u32) -> DailyStockRecord {
        DailyStockRecord {
            date: day(d),
            close: dec!(10),
            stock: "A".to_string(),
            shares_held: Decimal::ONE,
            avg_cost: dec!(10),
            equity: None,
            market_value: None,
            total_profit: None,
            daily_profit: None,
            per_share_profit: None,
            daily_pct_profit: None,
        }
    }

    #[test]
    fn test_full_plan_starts_at_first_transaction() {
        let plan = plan_refresh(&ledger(), &[], RefreshMode::Full, RefreshMode::Full, day(20));
        assert_eq!(plan.start_date, day(4));
        assert_eq!(plan.end_date, day(20));
        assert_eq!(plan.securities, vec!["A", "B"]);
        assert!(!plan.is_up_to_date());
    }

    #[test]
    fn test_delta_plan_starts_after_last_persisted_date() {
        let existing = vec![record(11), record(15), record(12)];
        let plan = plan_refresh(
            &ledger(),
            &existing,
            RefreshMode::Delta,
            RefreshMode::Delta,
            day(20),
        );
        assert_eq!(plan.start_date, day(16));
    }

    #[test]
    fn test_delta_plan_through_today_is_up_to_date() {
        let existing = vec![record(20)];
        let plan = plan_refresh(
            &ledger(),
            &existing,
            RefreshMode::Delta,
            RefreshMode::Delta,
            day(20),
        );
        assert_eq!(plan.start_date, day(21));
        assert!(plan.is_up_to_date());
    }

    #[test]
    fn test_refresh_mode_parsing() {
        assert_eq!("Delta".parse::<RefreshMode>().unwrap(), RefreshMode::Delta);
        assert!(" full ".parse::<RefreshMode>().is_ok());
        assert!("weekly".parse::<RefreshMode>().unwrap_err().is_configuration());
    }
}
