//! Report command.

use finboard_core::pipeline::PipelineCache;

use crate::cli::ReportArgs;
use crate::config::Config;
use crate::main_lib::build_store;
use crate::output::print_report;

pub fn execute(args: ReportArgs, config: &Config) -> anyhow::Result<()> {
    let mut cache = PipelineCache::new(build_store(config));
    if let Some(as_of) = args.as_of {
        cache = cache.with_as_of(as_of);
    }

    let cached = cache.get()?;
    print_report(&cached.result, cached.stale, args.format)
}
