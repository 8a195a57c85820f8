//! Shared pieces of the pattern-based providers.

use anyhow::Result;
use regex::{Captures, Regex};

use crate::core::GopmError;
use crate::vcs::{RawVcsReference, VcsReference, VcsType};

/// Allowed characters of one path segment in the host patterns.
pub(crate) const SEGMENT: &str = r"[A-Za-z0-9_.\-]+";

/// Trailing package path below a repository root.
pub(crate) const SUB_PATH: &str = r"(?P<subPath>(?:/[A-Za-z0-9_.\-]+)*)";

/// A provider's host prefix and the identifier pattern extracting its `root`.
///
/// Patterns are anchored and must define a `root` group; `subPath` is optional.
#[derive(Debug, Clone)]
pub struct IdMatcher {
    name: String,
    prefix: Option<String>,
    pattern: Regex,
}

impl IdMatcher {
    /// Compiles `pattern` for the provider called `name`.
    ///
    /// Without a prefix, identifiers are claimed by pattern alone.
    pub fn new(name: impl Into<String>, prefix: Option<&str>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|e| GopmError::VcsValidation {
            message: format!("Pattern of provider {name} is invalid: {e}"),
        })?;
        if !pattern.capture_names().flatten().any(|group| group == "root") {
            return Err(GopmError::VcsValidation {
                message: format!("Pattern of provider {name} has no 'root' group."),
            }
            .into());
        }
        Ok(Self {
            name,
            prefix: prefix.map(ToString::to_string),
            pattern,
        })
    }

    /// Display name of the provider.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the provider claims `id`.
    pub fn could_handle(&self, id: &str) -> bool {
        match &self.prefix {
            Some(prefix) => id.starts_with(prefix.as_str()),
            None => self.pattern.is_match(id),
        }
    }

    /// Matches a claimed identifier; a mismatch means the id is malformed for this host.
    pub fn captures<'a>(&self, raw: &'a RawVcsReference) -> Result<Captures<'a>> {
        self.pattern.captures(&raw.id).ok_or_else(|| {
            GopmError::VcsValidation {
                message: format!("Name of dependency {raw} is invalid for {}.", self.name),
            }
            .into()
        })
    }
}

/// The `root` capture.
pub(crate) fn root_of(captures: &Captures<'_>) -> String {
    captures.name("root").map(|m| m.as_str().to_string()).unwrap_or_default()
}

/// The `subPath` capture, `None` when absent or empty.
pub(crate) fn sub_path_of(captures: &Captures<'_>) -> Option<String> {
    captures.name("subPath").map(|m| m.as_str().to_string()).filter(|s| !s.is_empty())
}

/// Rejects an explicitly requested kind that contradicts the host's kind.
pub fn fixed_vcs_type(raw: &RawVcsReference, fixed: VcsType) -> Result<VcsType> {
    match raw.vcs_type {
        Some(selected) if selected != fixed => Err(GopmError::VcsValidation {
            message: format!(
                "There was the VCS type {selected} explicit selected for dependency {raw} but this VCS could only be of type {fixed}."
            ),
        }
        .into()),
        _ => Ok(fixed),
    }
}

/// `https://<root><suffix>`, with the kind's suffix added only when missing.
pub fn default_uri(root: &str, vcs_type: VcsType) -> String {
    let suffix = vcs_type.uri_suffix();
    let uri = format!("https://{root}");
    if uri.ends_with(suffix) { uri } else { format!("{uri}{suffix}") }
}

/// Parts of a classification before it becomes a [`VcsReference`].
#[derive(Debug, Clone)]
pub struct Classified {
    /// VCS kind
    pub vcs_type: VcsType,
    /// Canonical id (import root)
    pub id: String,
    /// Hosting root the URI is derived from
    pub root: String,
    /// Ref to fetch
    pub reference: Option<String>,
    /// Package path below the root
    pub sub_path: Option<String>,
}

impl Classified {
    /// A classification whose hosting root is the id and whose ref is the requested one.
    pub fn new(raw: &RawVcsReference, vcs_type: VcsType, captures: &Captures<'_>) -> Self {
        let root = root_of(captures);
        Self {
            vcs_type,
            id: root.clone(),
            root,
            reference: raw.reference.clone(),
            sub_path: sub_path_of(captures),
        }
    }

    /// Builds the reference; an explicit URI on `raw` wins over the derived one.
    pub fn into_reference(self, raw: &RawVcsReference) -> Result<VcsReference> {
        let uri = raw.uri.clone().unwrap_or_else(|| default_uri(&self.root, self.vcs_type));
        Ok(VcsReference::new(self.vcs_type, self.id, uri)?
            .with_root(self.root)
            .with_reference(self.reference)
            .with_update_policy(raw.update_policy)
            .with_sub_path(self.sub_path))
    }
}
