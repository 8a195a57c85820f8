//! `gopm classify`: show the repository an import path belongs to.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::GlobalOptions;
use super::common::build_registry;
use crate::vcs::{RawVcsReference, VcsReference};

/// Show the repository an import path belongs to.
#[derive(Args, Debug)]
pub struct ClassifyCommand {
    /// Import path, e.g. `github.com/foo/bar/baz`
    id: String,

    /// Version to request
    #[arg(long)]
    version: Option<String>,
}

/// `key: value` lines describing `reference`.
pub fn describe(reference: &VcsReference) -> Vec<(&'static str, String)> {
    vec![
        ("type", reference.vcs_type().to_string()),
        ("id", reference.id().to_string()),
        ("root", reference.root().to_string()),
        ("uri", reference.uri().to_string()),
        ("ref", reference.reference().unwrap_or("-").to_string()),
        ("sub-path", reference.sub_path().unwrap_or("-").to_string()),
    ]
}

impl ClassifyCommand {
    pub async fn execute(self, global: &GlobalOptions) -> Result<()> {
        let settings = global.load_settings()?;
        let registry = build_registry(&settings)?;
        let raw = RawVcsReference::new(self.id)
            .with_reference(self.version)
            .with_update_policy(settings.dependencies.update_policy);
        let reference = registry.classify(&raw).await?;

        for (key, value) in describe(&reference) {
            println!("{:>9} {value}", format!("{key}:").bold());
        }
        Ok(())
    }
}
