//! Finboard CLI - refresh and report entry points for the portfolio pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Rebuild the price series from the first transaction
//! finboard refresh --mode full
//!
//! # Append closes since the last stored date
//! finboard refresh --mode delta
//!
//! # Print the dashboard summary
//! finboard report --format text
//!
//! # Delta refresh every 6 hours
//! finboard schedule --mode delta --every-hours 6
//! ```

mod cli;
mod commands;
mod config;
mod main_lib;
mod output;
mod scheduler;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use main_lib::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    init_tracing(config.log_format);

    match cli.command {
        Commands::Refresh(args) => commands::refresh::execute(args, &config).await?,
        Commands::Report(args) => commands::report::execute(args, &config)?,
        Commands::Schedule(args) => commands::schedule::execute(args, &config).await?,
    }

    Ok(())
}
