//! `gopm get`: resolve the declared dependencies and fetch what is missing or stale.

use anyhow::Result;
use clap::Args;

use super::GlobalOptions;
use super::common::{build_resolver, print_resolution, report_deletions, resolve_with_progress, seed_dependencies};
use crate::cache::{self, CacheLock};
use crate::models::Configuration;

/// Resolve and fetch dependencies.
#[derive(Args, Debug)]
pub struct GetCommand {
    /// Only resolve the dependencies of one configuration (build, test, tool)
    #[arg(long, value_name = "NAME")]
    configuration: Option<Configuration>,

    /// Fetch every dependency even when its cached copy is fresh
    #[arg(short, long)]
    force_update: bool,
}

impl GetCommand {
    pub async fn execute(self, global: &GlobalOptions) -> Result<()> {
        let settings = global.load_settings()?;
        let cache_dir = settings.cache_dir()?;
        let resolver = build_resolver(&settings, self.force_update)?;
        let seeds = seed_dependencies(&settings, settings.declared(self.configuration)?)?;
        if seeds.is_empty() {
            println!("No dependencies declared");
            return Ok(());
        }

        let _lock = CacheLock::acquire(&cache_dir).await?;
        let resolution = resolve_with_progress(&resolver, &seeds, global.no_progress).await?;
        print_resolution(&resolution);

        // A partial closure would make every other configuration's checkouts look orphaned.
        if settings.dependencies.delete_unknown && self.configuration.is_none() {
            let report = cache::delete_orphans(&cache_dir, &resolution.ids)?;
            report_deletions(&report, "Deleted unknown")?;
        }
        Ok(())
    }
}
