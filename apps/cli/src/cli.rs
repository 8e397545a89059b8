//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use finboard_core::refresh::RefreshMode;

/// Finboard - personal portfolio dashboard pipeline.
#[derive(Parser, Debug)]
#[command(name = "finboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Flat-file store directory (overrides FINBOARD_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch closing prices and rewrite daily_stocks.csv
    Refresh(RefreshArgs),

    /// Run the pipeline over the stored files and print a summary
    Report(ReportArgs),

    /// Refresh on a fixed interval until interrupted
    Schedule(ScheduleArgs),
}

#[derive(Args, Debug)]
pub struct RefreshArgs {
    #[arg(long, value_enum)]
    pub mode: ModeArg,

    /// Also rebuild stocks.csv and stock_info.csv from the brokerage.
    ///
    /// Hidden until a brokerage holdings provider is wired in; for now it
    /// fails with a configuration error before any fetch.
    #[arg(long, hide = true)]
    pub profiles: bool,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Value the portfolio as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[arg(long, value_enum, default_value_t = ModeArg::Delta)]
    pub mode: ModeArg,

    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u64).range(1..))]
    pub every_hours: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Full,
    Delta,
}

impl From<ModeArg> for RefreshMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Full => RefreshMode::Full,
            ModeArg::Delta => RefreshMode::Delta,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_refresh_requires_mode() {
        assert!(Cli::try_parse_from(["finboard", "refresh"]).is_err());

        let cli = Cli::try_parse_from(["finboard", "refresh", "--mode", "full"]).unwrap();
        match cli.command {
            Commands::Refresh(args) => {
                assert_eq!(RefreshMode::from(args.mode), RefreshMode::Full);
                assert!(!args.profiles);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_profiles_flag_parses_but_is_not_advertised() {
        let cli =
            Cli::try_parse_from(["finboard", "refresh", "--mode", "delta", "--profiles"]).unwrap();
        match cli.command {
            Commands::Refresh(args) => assert!(args.profiles),
            other => panic!("unexpected command {:?}", other),
        }

        let mut cmd = Cli::command();
        let help = cmd
            .find_subcommand_mut("refresh")
            .unwrap()
            .render_help()
            .to_string();
        assert!(help.contains("--mode"));
        assert!(!help.contains("--profiles"));
    }

    #[test]
    fn test_schedule_defaults_and_bounds() {
        let cli = Cli::try_parse_from(["finboard", "schedule"]).unwrap();
        match cli.command {
            Commands::Schedule(args) => {
                assert_eq!(args.mode, ModeArg::Delta);
                assert_eq!(args.every_hours, 24);
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["finboard", "schedule", "--every-hours", "0"]).is_err());
    }

    #[test]
    fn test_report_flags() {
        let cli = Cli::try_parse_from([
            "finboard",
            "--data-dir",
            "/tmp/fb",
            "report",
            "--format",
            "json",
            "--as-of",
            "2024-03-15",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/fb")));
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.as_of, NaiveDate::from_ymd_opt(2024, 3, 15));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
