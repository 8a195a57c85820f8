//! `gopm clean`: remove orphans from the cache, or wipe it.

use anyhow::Result;
use clap::Args;

use super::GlobalOptions;
use super::common::{known_ids, report_deletions};
use crate::cache::{self, CacheLock};

/// Clean the dependency cache.
#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Delete every cached repository, not only the orphans
    #[arg(long)]
    all: bool,
}

impl CleanCommand {
    pub async fn execute(self, global: &GlobalOptions) -> Result<()> {
        let settings = global.load_settings()?;
        let cache_dir = settings.cache_dir()?;
        let _lock = CacheLock::acquire(&cache_dir).await?;

        let report = if self.all || settings.dependencies.delete_all_on_clean {
            tracing::debug!("Deleting everything in {}", cache_dir.display());
            cache::delete_all(&cache_dir)?
        } else if settings.dependencies.delete_unknown {
            let ids = known_ids(&settings, global.no_progress).await?;
            cache::delete_orphans(&cache_dir, &ids)?
        } else {
            println!("Nothing to clean: delete_unknown is disabled");
            return Ok(());
        };

        if report.attempted.is_empty() {
            println!("Nothing to clean");
        }
        report_deletions(&report, "Deleted")
    }
}
