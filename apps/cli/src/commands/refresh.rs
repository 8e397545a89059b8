//! Refresh command.

use finboard_core::refresh::RefreshServiceTrait;
use finboard_core::Error;
use tracing::info;

use crate::cli::RefreshArgs;
use crate::config::Config;
use crate::main_lib::build_refresh_service;
use crate::output::render_refresh;

pub async fn execute(args: RefreshArgs, config: &Config) -> anyhow::Result<()> {
    if args.profiles {
        // Checked first so a missing credential reports as such.
        config.require_geocoder_user_agent()?;
        return Err(Error::Configuration(
            "--profiles needs a brokerage holdings provider and none is configured".to_string(),
        )
        .into());
    }

    let service = build_refresh_service(config)?;
    let report = service.refresh(args.mode.into()).await?;
    info!("Refresh finished with {} warning(s)", report.warnings.len());
    print!("{}", render_refresh(&report));
    Ok(())
}
