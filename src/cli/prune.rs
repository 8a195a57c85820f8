//! `gopm prune`: delete the cache directories no dependency of the project uses.

use anyhow::Result;
use clap::Args;

use super::GlobalOptions;
use super::common::{known_ids, report_deletions};
use crate::cache::{self, CacheLock};

/// Delete orphaned cache directories.
#[derive(Args, Debug)]
pub struct PruneCommand {
    /// List what would be deleted without deleting it
    #[arg(long)]
    dry_run: bool,
}

impl PruneCommand {
    pub async fn execute(self, global: &GlobalOptions) -> Result<()> {
        let settings = global.load_settings()?;
        let cache_dir = settings.cache_dir()?;
        let _lock = CacheLock::acquire(&cache_dir).await?;
        let ids = known_ids(&settings, global.no_progress).await?;

        if self.dry_run {
            let plan = cache::deletion_plan(&cache_dir, &ids)?;
            if plan.is_empty() {
                println!("Nothing to prune");
            }
            for dir in plan {
                println!("Would delete {}", dir.display());
            }
            return Ok(());
        }

        let report = cache::delete_orphans(&cache_dir, &ids)?;
        if report.attempted.is_empty() {
            println!("Nothing to prune");
        }
        report_deletions(&report, "Deleted")
    }
}
