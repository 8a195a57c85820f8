//! Wiring shared by the subcommands.

use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cache::DeletionReport;
use crate::config::Settings;
use crate::git::GitCli;
use crate::models::{Dependency, DependencyKind, Outcome};
use crate::providers::{ProviderRegistry, ReqwestMetadataClient};
use crate::resolver::{DependencyResolver, Resolution};
use crate::scanner::create_scanner;
use crate::utils::ProgressBar;

/// The provider registry for `settings`, talking to real remotes.
pub fn build_registry(settings: &Settings) -> Result<ProviderRegistry> {
    ProviderRegistry::with_defaults(Arc::new(GitCli::new()), Arc::new(ReqwestMetadataClient::new()?), &settings.providers)
}

/// A resolver for `settings`; `force_update` adds to the configured flag.
pub fn build_resolver(settings: &Settings, force_update: bool) -> Result<DependencyResolver> {
    let go = settings.go_binary()?;
    let scanner = create_scanner(settings.dependencies.scanner, go.as_deref())?;
    Ok(DependencyResolver::new(
        build_registry(settings)?,
        scanner,
        settings.locator()?,
        settings.resolver_options(force_update),
    ))
}

/// Everything `get` starts from: the project's own package when it has sources, then the
/// declared dependencies.
pub fn seed_dependencies(settings: &Settings, declared: Vec<Dependency>) -> Result<Vec<Dependency>> {
    let mut seeds: Vec<Dependency> = settings.own_package()?.into_iter().collect();
    seeds.extend(declared);
    Ok(seeds)
}

/// Resolves `seeds` behind a spinner.
pub async fn resolve_with_progress(
    resolver: &DependencyResolver,
    seeds: &[Dependency],
    no_progress: bool,
) -> Result<Resolution> {
    let spinner = ProgressBar::spinner_unless(no_progress);
    spinner.set_message(format!("Resolving {} dependencies", seeds.len()));
    let result = resolver.resolve(seeds).await;
    spinner.finish_and_clear();
    result
}

/// The canonical ids of the full closure, across every configuration.
pub async fn known_ids(settings: &Settings, no_progress: bool) -> Result<BTreeSet<String>> {
    let resolver = build_resolver(settings, false)?;
    let seeds = seed_dependencies(settings, settings.declared(None)?)?;
    Ok(resolve_with_progress(&resolver, &seeds, no_progress).await?.ids)
}

/// One line for a resolved dependency.
pub fn format_entry(dependency: &Dependency, outcome: Outcome) -> String {
    let location = dependency.location().map(|l| format!(" ({})", l.display())).unwrap_or_default();
    let kind = match dependency.kind {
        DependencyKind::Explicit => String::new(),
        kind => format!(" [{kind}]"),
    };
    format!("{dependency}{kind}: {outcome}{location}")
}

/// Prints every entry of `resolution`.
pub fn print_resolution(resolution: &Resolution) {
    for (dependency, outcome) in &resolution.dependencies {
        let line = format_entry(dependency, *outcome);
        match outcome {
            Outcome::Downloaded => println!("{}", line.green()),
            Outcome::AlreadySatisfied => println!("{}", line.dimmed()),
        }
    }
    let downloaded = resolution.downloaded().count();
    println!(
        "{} {} dependencies, {} downloaded",
        "Resolved".bold(),
        resolution.dependencies.len(),
        downloaded
    );
}

/// Prints what a deletion pass did. Returns an error when anything could not be deleted.
pub fn report_deletions(report: &DeletionReport, verb: &str) -> Result<()> {
    for path in &report.deleted {
        println!("{} {}", verb.yellow(), path.display());
    }
    for (path, reason) in &report.failed {
        eprintln!("{} {}: {reason}", "Could not delete".red(), path.display());
    }
    if report.is_complete() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} of {} cache entries could not be deleted", report.failed.len(), report.attempted.len()))
    }
}
