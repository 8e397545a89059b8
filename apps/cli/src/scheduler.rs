//! Periodic price refresh.
//!
//! Runs a refresh on a fixed interval and recomputes the dashboard after
//! every successful cycle. A failed cycle leaves the persisted series and
//! the last computed dashboard in place.

use std::future::Future;

use finboard_core::pipeline::PipelineCache;
use finboard_core::refresh::{RefreshMode, RefreshServiceTrait};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Refreshes every `every` until `shutdown` resolves. The first cycle runs
/// immediately.
pub async fn run_refresh_scheduler<S, F>(
    service: &S,
    cache: &PipelineCache,
    mode: RefreshMode,
    every: Duration,
    shutdown: F,
) where
    S: RefreshServiceTrait + ?Sized,
    F: Future<Output = ()>,
{
    info!(
        "Refresh scheduler started ({} mode, every {}h)",
        mode,
        every.as_secs() / 3600
    );

    let mut refresh_interval = interval(every);
    refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = refresh_interval.tick() => {
                run_scheduled_refresh(service, cache, mode).await;
            }
            _ = &mut shutdown => {
                info!("Refresh scheduler stopped");
                return;
            }
        }
    }
}

/// Runs one cycle. Returns whether the refresh itself succeeded.
async fn run_scheduled_refresh<S>(service: &S, cache: &PipelineCache, mode: RefreshMode) -> bool
where
    S: RefreshServiceTrait + ?Sized,
{
    info!("Running scheduled {} refresh...", mode);

    let report = match service.refresh(mode).await {
        Ok(report) => report,
        Err(e) => {
            warn!("Scheduled refresh failed, keeping last snapshot: {}", e);
            return false;
        }
    };

    if report.up_to_date {
        debug!("Scheduled refresh found nothing new");
    } else {
        info!(
            "Scheduled refresh wrote {} rows ({} failures)",
            report.rows_written,
            report.failures.len()
        );
    }

    cache.invalidate();
    match cache.get() {
        Ok(cached) if cached.stale => {
            warn!("Dashboard recompute failed; serving the previous result")
        }
        Ok(cached) => info!(
            "Dashboard recomputed with {} warning(s)",
            cached.result.warnings.len()
        ),
        Err(e) => warn!("Dashboard recompute failed: {}", e),
    }
    true
}
