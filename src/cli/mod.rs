//! Command-line interface.
//!
//! Every subcommand is a thin wrapper over the library: it loads [`Settings`] for the
//! project, builds the collaborators it needs and prints the outcome.
//!
//! | Command | Effect |
//! |---|---|
//! | `gopm get` | Resolve and fetch the closure of the declared dependencies |
//! | `gopm prune` | Delete cache directories the closure no longer uses |
//! | `gopm clean` | Delete orphans, or everything with `--all` |
//! | `gopm classify <id>` | Show how an import path maps to a repository |
//! | `gopm scan <file>...` | List the imports of source files |
//!
//! # Global options
//!
//! - `-v, --verbose` - debug logging
//! - `-q, --quiet` - errors only, no spinner
//! - `-c, --config <path>` - configuration file (`GOPM_CONFIG`), default `<project>/gopm.toml`
//! - `--project <dir>` - project directory, default the current directory
//! - `--no-progress` - never draw the spinner
//!
//! `RUST_LOG` takes precedence over `--verbose` and `--quiet`.

mod classify;
mod clean;
pub mod common;
mod get;
mod prune;
mod scan;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Project directory
    pub project: Option<PathBuf>,
    /// Configuration file
    pub config: Option<PathBuf>,
    /// Hide the spinner
    pub no_progress: bool,
}

impl GlobalOptions {
    /// Loads the project settings these options point at.
    pub fn load_settings(&self) -> Result<Settings> {
        let project = match &self.project {
            Some(project) => project.clone(),
            None => std::env::current_dir()?,
        };
        Settings::load(&project, self.config.as_deref())
    }
}

/// Go dependency manager.
#[derive(Parser)]
#[command(
    name = "gopm",
    about = "Fetch the Go dependencies of a project into a local cache",
    version,
    long_about = "gopm resolves the transitive imports of a Go project, fetches the repositories \
                  that provide them into a dependency cache and keeps that cache free of \
                  repositories nothing uses anymore."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file
    #[arg(short, long, global = true, env = "GOPM_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Project directory
    #[arg(long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Disable the progress spinner
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and fetch dependencies
    Get(get::GetCommand),

    /// Delete cache directories no dependency uses
    Prune(prune::PruneCommand),

    /// Clean the dependency cache
    Clean(clean::CleanCommand),

    /// Show the repository an import path belongs to
    Classify(classify::ClassifyCommand),

    /// List the imports of source files
    Scan(scan::ScanCommand),
}

impl Cli {
    /// Installs logging and runs the selected subcommand.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);
        let global = self.global_options();

        match self.command {
            Commands::Get(cmd) => cmd.execute(&global).await,
            Commands::Prune(cmd) => cmd.execute(&global).await,
            Commands::Clean(cmd) => cmd.execute(&global).await,
            Commands::Classify(cmd) => cmd.execute(&global).await,
            Commands::Scan(cmd) => cmd.execute(&global).await,
        }
    }

    /// Options shared with the subcommands.
    #[must_use]
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            project: self.project.clone(),
            config: self.config.clone(),
            no_progress: self.no_progress || self.quiet,
        }
    }
}

/// Log level selected by the flags when `RUST_LOG` is unset.
const fn default_level(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    }
}

/// Installs the stderr subscriber. A second call is a no-op.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gopm", "get", "--project", "/work/app", "-q"]).unwrap();
        let global = cli.global_options();
        assert_eq!(global.project, Some(PathBuf::from("/work/app")));
        assert!(global.no_progress);
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["gopm", "-v", "-q", "prune"]).is_err());
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true, false), "debug");
        assert_eq!(default_level(false, true), "error");
        assert_eq!(default_level(false, false), "info");
    }

    #[test]
    fn test_configuration_argument() {
        assert!(Cli::try_parse_from(["gopm", "get", "--configuration", "test"]).is_ok());
        assert!(Cli::try_parse_from(["gopm", "get", "--configuration", "docs"]).is_err());
    }
}
