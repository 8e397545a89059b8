//! Schedule command.

use std::time::Duration;

use finboard_core::pipeline::PipelineCache;
use tracing::warn;

use crate::cli::ScheduleArgs;
use crate::config::Config;
use crate::main_lib::{build_refresh_service, build_store};
use crate::scheduler::run_refresh_scheduler;

pub async fn execute(args: ScheduleArgs, config: &Config) -> anyhow::Result<()> {
    let service = build_refresh_service(config)?;
    let cache = PipelineCache::new(build_store(config));
    let every = Duration::from_secs(args.every_hours.saturating_mul(60 * 60));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    run_refresh_scheduler(&service, &cache, args.mode.into(), every, shutdown).await;
    Ok(())
}
