//! `gopm scan`: list the imports of source files.

use anyhow::{Context, Result};
use clap::Args;
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::GlobalOptions;
use crate::scanner::create_scanner;
use crate::utils::platform::absolutize;

/// List the imports of source files.
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// Source files to scan
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl ScanCommand {
    pub async fn execute(self, global: &GlobalOptions) -> Result<()> {
        let settings = global.load_settings()?;
        let go = settings.go_binary()?;
        let scanner = create_scanner(settings.dependencies.scanner, go.as_deref())?;

        let cwd = std::env::current_dir()?;
        let mut imports = BTreeSet::new();
        for file in &self.files {
            let file = absolutize(&cwd, file);
            let found =
                scanner.scan_file(&file).await.with_context(|| format!("Failed to scan {}", file.display()))?;
            imports.extend(found);
        }
        for import in imports {
            println!("{import}");
        }
        Ok(())
    }
}
