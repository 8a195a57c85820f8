//! gopm - Go dependency manager
//!
//! gopm computes the transitive closure of a Go project's dependencies by scanning source
//! files for imports, maps every import path to the repository hosting it, fetches those
//! repositories into a local dependency cache and removes cached repositories nothing uses.
//!
//! # Architecture Overview
//!
//! A run of `gopm get` flows through these pieces:
//!
//! 1. [`config`] loads `gopm.toml` and the environment into [`config::Settings`].
//! 2. [`resolver`] walks the dependency graph breadth-first. For every dependency it asks
//!    [`providers`] to classify the import path into a [`vcs::VcsReference`] (kind,
//!    canonical id, remote URI), lets [`vcs`] fetch the repository unless the [`ledger`]
//!    entry is still fresh, finds the sources with its `Locator` and hands them to
//!    [`scanner`] to discover further imports.
//! 3. [`cache`] classifies the cache directories against the ids the closure used and
//!    deletes the orphans.
//!
//! # Core Modules
//!
//! - [`core`] - error taxonomy and user-facing error display
//! - [`models`] - dependencies, outcomes, configurations and dependency notation
//! - [`version`] - integer versions used to compare gopkg.in tags
//! - [`vcs`] - VCS kinds, references and repositories
//! - [`git`] - the `git` command line and the [`git::GitTransport`] seam
//! - [`ledger`] - `.vcs-repository-info` side files and update policies
//! - [`providers`] - hosting providers mapping import paths to repositories
//! - [`scanner`] - import extraction from Go source files
//! - [`resolver`] - the resolution engine
//! - [`cache`] - cache locking and reconciliation
//! - [`config`] - project settings
//! - [`cli`] - the `gopm` command line
//! - [`utils`] - filesystem, platform and progress helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use gopm::cli::common::build_resolver;
//! use gopm::config::Settings;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::load(Path::new("."), None)?;
//! let resolver = build_resolver(&settings, false)?;
//! let resolution = resolver.resolve(&settings.declared(None)?).await?;
//! for (dependency, outcome) in &resolution.dependencies {
//!     println!("{dependency}: {outcome}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod git;
pub mod ledger;
pub mod models;
pub mod providers;
pub mod resolver;
pub mod scanner;
pub mod utils;
pub mod vcs;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
