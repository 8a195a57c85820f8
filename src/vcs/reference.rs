//! VCS kinds and the references flowing from classification to fetching.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::GopmError;
use crate::ledger::UpdatePolicy;

/// Version control systems a dependency can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsType {
    /// Git, the only kind that can be fetched.
    Git,
    /// Mercurial
    Hg,
    /// Bazaar
    Bzr,
    /// Subversion
    Svn,
    /// Placed by hand, never fetched.
    Manual,
}

impl VcsType {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [Self::Git, Self::Hg, Self::Bzr, Self::Svn, Self::Manual];

    /// Short lowercase name (`git`, `hg`, ...).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Hg => "hg",
            Self::Bzr => "bzr",
            Self::Svn => "svn",
            Self::Manual => "manual",
        }
    }

    /// Suffix conventionally appended to remote URIs of this kind.
    #[must_use]
    pub const fn uri_suffix(&self) -> &'static str {
        match self {
            Self::Git => ".git",
            Self::Hg => ".hg",
            Self::Bzr => ".bzr",
            Self::Svn => ".svn",
            Self::Manual => "",
        }
    }
}

impl fmt::Display for VcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VcsType {
    type Err = GopmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|candidate| candidate.name() == value).ok_or_else(|| {
            GopmError::VcsValidation {
                message: format!("Unknown VCS type '{value}'. Expected one of git, hg, bzr, svn, manual."),
            }
        })
    }
}

/// An unvalidated identifier as declared by the user or discovered by scanning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawVcsReference {
    /// Explicitly requested VCS kind
    pub vcs_type: Option<VcsType>,
    /// Import path, e.g. `github.com/foo/bar/sub`
    pub id: String,
    /// Explicit remote URI
    pub uri: Option<String>,
    /// Requested ref (tag, branch or ref name)
    pub reference: Option<String>,
    /// Refresh policy
    pub update_policy: UpdatePolicy,
}

impl RawVcsReference {
    /// A reference carrying only the identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            vcs_type: None,
            id: id.into(),
            uri: None,
            reference: None,
            update_policy: UpdatePolicy::default(),
        }
    }

    /// Sets the requested ref.
    #[must_use]
    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference;
        self
    }

    /// Sets the explicit remote URI.
    #[must_use]
    pub fn with_uri(mut self, uri: Option<String>) -> Self {
        self.uri = uri;
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
}

impl fmt::Display for RawVcsReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(reference) => write!(f, "{}@{reference}", self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// A classified reference: kind, canonical id and concrete remote.
///
/// Construction validates immediately; a reference without an id or URI cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VcsReference {
    vcs_type: VcsType,
    id: String,
    root: String,
    uri: String,
    reference: Option<String>,
    update_policy: UpdatePolicy,
    sub_path: Option<String>,
}

impl VcsReference {
    /// Creates a reference whose repository root equals its id.
    pub fn new(
        vcs_type: VcsType,
        id: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<Self, GopmError> {
        let id = id.into();
        let uri = uri.into();
        if id.trim().is_empty() {
            return Err(GopmError::VcsValidation {
                message: format!("No id provided for {vcs_type} reference with uri '{uri}'."),
            });
        }
        if uri.trim().is_empty() {
            return Err(GopmError::VcsValidation {
                message: format!("No uri provided for {vcs_type} reference '{id}'."),
            });
        }
        Ok(Self {
            vcs_type,
            root: id.clone(),
            id,
            uri,
            reference: None,
            update_policy: UpdatePolicy::default(),
            sub_path: None,
        })
    }

    /// Sets the hosting root when it differs from the import id (path rewriting hosts).
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the requested ref.
    #[must_use]
    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference.filter(|r| !r.is_empty());
        self
    }

    /// Sets the update policy.
    #[must_use]
    pub const fn with_update_policy(mut self, update_policy: UpdatePolicy) -> Self {
        self.update_policy = update_policy;
        self
    }

    /// Sets the sub-path below the repository root (with leading `/`).
    #[must_use]
    pub fn with_sub_path(mut self, sub_path: Option<String>) -> Self {
        self.sub_path = sub_path.filter(|s| !s.is_empty());
        self
    }

    /// The VCS kind.
    pub const fn vcs_type(&self) -> VcsType {
        self.vcs_type
    }

    /// Canonical id: the import-path prefix identifying the repository. Cached checkouts
    /// live under `<cache>/<id>`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Hosting root the remote URI was derived from, e.g. `github.com/go-yaml/yaml` for
    /// `gopkg.in/yaml.v2`.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Remote URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Requested ref, `None` meaning the remote `HEAD`.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Refresh policy.
    pub const fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    /// Sub-path of the original identifier below the root.
    pub fn sub_path(&self) -> Option<&str> {
        self.sub_path.as_deref()
    }
}

impl fmt::Display for VcsReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(reference) => write!(f, "{}@{reference}", self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// A reference together with the concrete revision a fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsFullReference {
    reference: VcsReference,
    full: String,
}

impl VcsFullReference {
    /// Pairs a reference with its fetched revision.
    pub fn new(reference: VcsReference, full: impl Into<String>) -> Self {
        Self {
            reference,
            full: full.into(),
        }
    }

    /// The reference that was fetched.
    pub const fn reference(&self) -> &VcsReference {
        &self.reference
    }

    /// The concrete revision (commit hash for git).
    pub fn full(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for VcsFullReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.reference.id(), self.full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_type_names_and_suffixes() {
        assert_eq!(VcsType::Git.uri_suffix(), ".git");
        assert_eq!(VcsType::Manual.uri_suffix(), "");
        for vcs_type in VcsType::ALL {
            assert_eq!(vcs_type.name().parse::<VcsType>().unwrap(), vcs_type);
        }
        assert!("cvs".parse::<VcsType>().is_err());
    }

    #[test]
    fn test_vcs_type_serde_lowercase() {
        assert_eq!(serde_json::to_string(&VcsType::Hg).unwrap(), "\"hg\"");
        assert_eq!(serde_json::from_str::<VcsType>("\"git\"").unwrap(), VcsType::Git);
    }

    #[test]
    fn test_reference_requires_uri() {
        let error = VcsReference::new(VcsType::Git, "github.com/a/b", "").unwrap_err();
        assert!(matches!(error, GopmError::VcsValidation { .. }));
    }

    #[test]
    fn test_reference_requires_id() {
        assert!(VcsReference::new(VcsType::Git, " ", "https://github.com/a/b.git").is_err());
    }

    #[test]
    fn test_reference_defaults() {
        let reference =
            VcsReference::new(VcsType::Git, "github.com/a/b", "https://github.com/a/b.git")
                .unwrap()
                .with_reference(Some(String::new()))
                .with_sub_path(Some("/sub".to_string()));
        assert_eq!(reference.root(), "github.com/a/b");
        assert_eq!(reference.reference(), None);
        assert_eq!(reference.sub_path(), Some("/sub"));
        assert_eq!(reference.update_policy(), UpdatePolicy::Never);
        assert_eq!(reference.to_string(), "github.com/a/b");
    }

    #[test]
    fn test_raw_display() {
        let raw = RawVcsReference::new("gopkg.in/yaml.v2").with_reference(Some("v2.1".into()));
        assert_eq!(raw.to_string(), "gopkg.in/yaml.v2@v2.1");
    }

    #[test]
    fn test_full_reference_display() {
        let reference =
            VcsReference::new(VcsType::Git, "github.com/a/b", "https://github.com/a/b.git")
                .unwrap();
        let full = VcsFullReference::new(reference, "abc123");
        assert_eq!(full.to_string(), "github.com/a/b@abc123");
        assert_eq!(full.full(), "abc123");
    }
}
