//! Transitive dependency resolution.
//!
//! [`DependencyResolver`] computes the closure of a set of declared dependencies with a
//! breadth-first walk over a FIFO work queue:
//!
//! 1. The declared dependencies seed the queue, duplicates removed.
//! 2. Each popped dependency is classified into a [`VcsReference`]. Its canonical id is the
//!    unit of work: an id handled earlier in the run is recorded as already satisfied and
//!    never fetched twice, so `github.com/a/b` and `github.com/a/b/sub` share one fetch.
//! 3. The repository is fetched into the cache unless its ledger entry is still fresh (or
//!    unconditionally with `force_update`).
//! 4. The [`Locator`] finds where the sources live and settles the dependency's kind.
//! 5. The sources are scanned for imports; hosted packages that were neither handled nor
//!    queued are appended to the queue.
//!
//! Packages in the project's own namespace are never classified or fetched: they are
//! `source` dependencies whose tree is scanned in place.
//!
//! Any classification, fetch or scan failure aborts the whole run with an error naming the
//! dependency. The result is ordered by dependency identity, not by discovery order.
//!
//! The walk is sequential; no two fetches overlap.

mod locator;

pub use locator::{Locator, group_dir};

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::Path;

use crate::ledger::{self, UpdatePolicy};
use crate::models::{Dependency, DependencyKind, Outcome};
use crate::providers::ProviderRegistry;
use crate::scanner::{self, ImportScanner};
use crate::vcs::{RawVcsReference, VcsReference, target_dir_for};

/// Knobs of a resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Fetch every dependency even when its ledger entry is fresh
    pub force_update: bool,
    /// Update policy given to dependencies discovered through imports
    pub default_policy: UpdatePolicy,
}

/// The closure computed by [`DependencyResolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Every dependency met during the walk with what it took to satisfy it
    pub dependencies: BTreeMap<Dependency, Outcome>,
    /// Canonical ids of the repositories in the cache that the closure uses
    pub ids: BTreeSet<String>,
}

impl Resolution {
    /// Entries that were fetched during the run.
    pub fn downloaded(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|(_, outcome)| **outcome == Outcome::Downloaded).map(|(d, _)| d)
    }
}

/// Per-run bookkeeping, owned by a single [`DependencyResolver::resolve`] call.
#[derive(Default)]
struct WalkState {
    queue: VecDeque<Dependency>,
    queued: HashSet<String>,
    /// Canonical id to the version that claimed it first
    handled: HashMap<String, Option<String>>,
    recorded: HashSet<String>,
    classified: HashMap<RawVcsReference, VcsReference>,
    resolution: Resolution,
}

impl WalkState {
    fn enqueue(&mut self, dependency: Dependency) {
        tracing::debug!(target: "resolver", "[ENQUEUE] {dependency} ({} queued)", self.queue.len() + 1);
        self.queued.insert(dependency.group.clone());
        self.queue.push_back(dependency);
    }

    fn record(&mut self, dependency: Dependency, outcome: Outcome) {
        tracing::info!(target: "resolver", "{dependency} ({}): {outcome}", dependency.kind);
        self.recorded.insert(dependency.group.clone());
        self.resolution.dependencies.insert(dependency, outcome);
    }
}

/// Breadth-first resolver over a provider registry, an import scanner and a directory layout.
pub struct DependencyResolver {
    registry: ProviderRegistry,
    scanner: Box<dyn ImportScanner>,
    locator: Locator,
    options: ResolverOptions,
}

impl DependencyResolver {
    /// Creates a resolver.
    pub fn new(
        registry: ProviderRegistry,
        scanner: Box<dyn ImportScanner>,
        locator: Locator,
        options: ResolverOptions,
    ) -> Self {
        Self {
            registry,
            scanner,
            locator,
            options,
        }
    }

    /// The directory layout.
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The provider registry.
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Resolves the closure of `declared`.
    ///
    /// When two declared dependencies claim the same canonical id, the first one in `declared`
    /// decides the version; the other is reported as already satisfied with a warning.
    pub async fn resolve(&self, declared: &[Dependency]) -> Result<Resolution> {
        let mut state = WalkState::default();
        let mut seeds = BTreeSet::new();
        for dependency in declared {
            if seeds.insert(dependency.clone()) {
                state.enqueue(dependency.clone());
            }
        }

        while let Some(dependency) = state.queue.pop_front() {
            tracing::debug!(target: "resolver", "[QUEUE_POP] {dependency} ({} remaining)", state.queue.len());
            let group = dependency.group.clone();
            self.visit(dependency, &mut state)
                .await
                .with_context(|| format!("Failed to resolve dependency '{group}'"))?;
        }

        tracing::debug!(
            target: "resolver",
            "Resolved {} dependencies from {} repositories",
            state.resolution.dependencies.len(),
            state.resolution.ids.len()
        );
        Ok(state.resolution)
    }

    async fn visit(&self, mut dependency: Dependency, state: &mut WalkState) -> Result<()> {
        if self.locator.in_namespace(&dependency.group) {
            return self.visit_source(dependency, state).await;
        }

        let reference = self.classify(&dependency, state).await?;
        let id = reference.id().to_string();
        if let Some(claimed) = state.handled.get(&id) {
            if dependency.kind == DependencyKind::Explicit && claimed.as_deref() != dependency.version.as_deref() {
                tracing::warn!(
                    "Ignoring {dependency}: {id} is already resolved at {}",
                    claimed.as_deref().unwrap_or("the remote default")
                );
            }
            self.record_satisfied(dependency, state);
            return Ok(());
        }
        state.handled.insert(id.clone(), dependency.version.clone());

        let repository = self.registry.factory().create(reference);
        let cache_root = self.locator.cache_root();
        let hand_maintained = ledger::is_hand_maintained(&target_dir_for(cache_root, repository.reference()));
        let outcome = if self.options.force_update && !hand_maintained {
            repository.force_update(cache_root).await?;
            Outcome::Downloaded
        } else {
            match repository.update_if_required(cache_root).await? {
                Some(_) => Outcome::Downloaded,
                None => Outcome::AlreadySatisfied,
            }
        };
        state.resolution.ids.insert(id.clone());

        let (kind, location) = self.locator.locate(&dependency);
        dependency.kind = kind;
        dependency.location = location;

        // A checkout in the cache is scanned as a whole repository.
        let scan_root = match (&dependency.location, kind) {
            (_, DependencyKind::System) | (None, _) => None,
            (Some(location), _) if *location == group_dir(cache_root, &dependency.group) => {
                Some(group_dir(cache_root, &id))
            }
            (Some(location), _) => Some(location.clone()),
        };

        let parent = dependency.clone();
        state.record(dependency, outcome);
        if let Some(dir) = scan_root {
            self.discover(&parent, &dir, state).await?;
        }
        Ok(())
    }

    async fn visit_source(&self, mut dependency: Dependency, state: &mut WalkState) -> Result<()> {
        let package = self.locator.package().unwrap_or(&dependency.group).to_string();
        if state.handled.contains_key(&package) {
            self.record_satisfied(dependency, state);
            return Ok(());
        }
        state.handled.insert(package.clone(), None);

        dependency.kind = DependencyKind::Source;
        dependency.location = self.locator.source_dir(&dependency.group);
        let scan_root = self.locator.source_dir(&package);

        let parent = dependency.clone();
        state.record(dependency, Outcome::AlreadySatisfied);
        if let Some(dir) = scan_root {
            self.discover(&parent, &dir, state).await?;
        }
        Ok(())
    }

    fn record_satisfied(&self, mut dependency: Dependency, state: &mut WalkState) {
        if state.recorded.contains(&dependency.group) {
            tracing::trace!(target: "resolver", "{dependency} is already recorded");
            return;
        }
        let (kind, location) = if self.locator.in_namespace(&dependency.group) {
            (DependencyKind::Source, self.locator.source_dir(&dependency.group))
        } else {
            self.locator.locate(&dependency)
        };
        dependency.kind = kind;
        dependency.location = location;
        state.record(dependency, Outcome::AlreadySatisfied);
    }

    async fn classify(&self, dependency: &Dependency, state: &mut WalkState) -> Result<VcsReference> {
        let raw = dependency.to_raw_reference();
        if let Some(reference) = state.classified.get(&raw) {
            return Ok(reference.clone());
        }
        let reference = self.registry.classify(&raw).await?;
        tracing::debug!(target: "resolver", "{raw} is {} at {}", reference.id(), reference.uri());
        state.classified.insert(raw, reference.clone());
        Ok(reference)
    }

    async fn discover(&self, parent: &Dependency, dir: &Path, state: &mut WalkState) -> Result<()> {
        let imports = scanner::scan_dir(self.scanner.as_ref(), dir).await?;
        let provenance = parent.as_parent();
        for import in imports.into_iter().filter(|import| scanner::looks_external(import)) {
            if import == parent.group || state.handled.contains_key(&import) || state.queued.contains(&import) {
                continue;
            }
            state.enqueue(
                Dependency::implicit(import, Some(provenance.clone()))
                    .with_update_policy(self.options.default_policy),
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("registry", &self.registry)
            .field("locator", &self.locator)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
