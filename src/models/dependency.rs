//! Nodes of the resolution graph.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::ledger::UpdatePolicy;
use crate::vcs::{RawVcsReference, VcsType};

/// How a dependency entered or ended up in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Declared in the project configuration
    Explicit,
    /// Discovered through an import
    Implicit,
    /// Part of the project's own source tree
    Source,
    /// Part of the Go distribution
    System,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Explicit => "explicit",
            Self::Implicit => "implicit",
            Self::Source => "source",
            Self::System => "system",
        })
    }
}

/// Provenance of an implicit dependency: the group and location of the dependency whose
/// sources imported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parent {
    /// Group of the importing dependency
    pub group: String,
    /// Where the importing dependency was found
    pub location: Option<PathBuf>,
}

/// A package the project needs.
///
/// Equality, hashing and ordering use `(group, version, uri, vcs_type, update_policy,
/// location)`; `kind` and `parent` are bookkeeping and never distinguish two dependencies.
#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    /// Import path, e.g. `github.com/foo/bar`
    pub group: String,
    /// Pinned tag, branch or ref
    pub version: Option<String>,
    /// Explicit repository URI
    pub uri: Option<String>,
    /// Explicit VCS kind
    #[serde(rename = "type")]
    pub vcs_type: Option<VcsType>,
    /// Refresh policy
    pub update_policy: UpdatePolicy,
    /// Classification
    pub kind: DependencyKind,
    /// Importing dependency, for implicit ones
    #[serde(skip)]
    pub parent: Option<Parent>,
    /// Directory the sources were found in
    pub location: Option<PathBuf>,
}

impl Dependency {
    fn with_kind(group: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            group: group.into(),
            version: None,
            uri: None,
            vcs_type: None,
            update_policy: UpdatePolicy::default(),
            kind,
            parent: None,
            location: None,
        }
    }

    /// A declared dependency.
    pub fn explicit(group: impl Into<String>) -> Self {
        Self::with_kind(group, DependencyKind::Explicit)
    }

    /// A dependency discovered in the sources of `parent`.
    pub fn implicit(group: impl Into<String>, parent: Option<Parent>) -> Self {
        let mut dependency = Self::with_kind(group, DependencyKind::Implicit);
        dependency.parent = parent;
        dependency
    }

    /// Sets the pinned version.
    #[must_use]
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version.filter(|v| !v.is_empty());
        self
    }

    /// Sets the explicit URI.
    #[must_use]
    pub fn with_uri(mut self, uri: Option<String>) -> Self {
        self.uri = uri.filter(|u| !u.is_empty());
        self
    }

    /// Sets the explicit VCS kind.
    #[must_use]
    pub const fn with_type(mut self, vcs_type: Option<VcsType>) -> Self {
        self.vcs_type = vcs_type;
        self
    }

    /// Sets the update policy.
    #[must_use]
    pub const fn with_update_policy(mut self, update_policy: UpdatePolicy) -> Self {
        self.update_policy = update_policy;
        self
    }

    /// The location, if resolved.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Provenance snapshot handed to the dependencies found in this one's sources.
    pub fn as_parent(&self) -> Parent {
        Parent {
            group: self.group.clone(),
            location: self.location.clone(),
        }
    }

    /// The unvalidated reference classification starts from.
    pub fn to_raw_reference(&self) -> RawVcsReference {
        RawVcsReference::new(self.group.clone())
            .with_type(self.vcs_type)
            .with_uri(self.uri.clone())
            .with_reference(self.version.clone())
            .with_update_policy(self.update_policy)
    }

    #[allow(clippy::type_complexity)]
    fn identity(
        &self,
    ) -> (&str, Option<&str>, Option<&str>, Option<VcsType>, UpdatePolicy, Option<&Path>) {
        (
            &self.group,
            self.version.as_deref(),
            self.uri.as_deref(),
            self.vcs_type,
            self.update_policy,
            self.location.as_deref(),
        )
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Dependency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dependency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{version}", self.group),
            None => f.write_str(&self.group),
        }
    }
}
