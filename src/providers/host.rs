//! Hosts with a fixed VCS kind whose canonical id is the matched root.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::VcsProvider;
use super::support::{Classified, IdMatcher, SEGMENT, SUB_PATH, fixed_vcs_type};
use crate::vcs::{RawVcsReference, VcsReference, VcsType};

/// A user-declared hosting provider (`[[providers]]` in `gopm.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDefinition {
    /// Display name used in error messages
    pub name: String,
    /// Identifier prefix the provider claims
    pub prefix: String,
    /// VCS kind of every repository on the host
    #[serde(rename = "type", default = "default_vcs_type")]
    pub vcs_type: VcsType,
    /// Anchored pattern with a `root` group and an optional `subPath` group
    pub pattern: String,
}

const fn default_vcs_type() -> VcsType {
    VcsType::Git
}

/// Provider for a host whose repositories are all of one kind.
#[derive(Debug, Clone)]
pub struct HostProvider {
    matcher: IdMatcher,
    vcs_type: VcsType,
}

impl HostProvider {
    /// A provider claiming `prefix` and parsing ids with `pattern`.
    pub fn new(name: &str, prefix: &str, pattern: &str, vcs_type: VcsType) -> Result<Self> {
        Ok(Self {
            matcher: IdMatcher::new(name, Some(prefix), pattern)?,
            vcs_type,
        })
    }

    /// `github.com/<owner>/<repo>`
    pub fn github() -> Result<Self> {
        Self::new(
            "GitHub",
            "github.com/",
            &format!(r"^(?P<root>github\.com/{SEGMENT}/{SEGMENT}){SUB_PATH}$"),
            VcsType::Git,
        )
    }

    /// `hub.jazz.net/git/<user>/<repo>`
    pub fn hub_jazz() -> Result<Self> {
        Self::new(
            "IBM Bluemix DevOps Services",
            "hub.jazz.net/git/",
            &format!(r"^(?P<root>hub\.jazz\.net/git/[a-z0-9]+/{SEGMENT}){SUB_PATH}$"),
            VcsType::Git,
        )
    }

    /// `git.apache.org/<repo>.git`
    pub fn git_apache() -> Result<Self> {
        Self::new(
            "Git at Apache",
            "git.apache.org/",
            &format!(r"^(?P<root>git\.apache\.org/[a-z0-9_.\-]+\.git){SUB_PATH}$"),
            VcsType::Git,
        )
    }

    /// `git.openstack.org/<group>/<repo>[.git]`
    pub fn git_openstack() -> Result<Self> {
        Self::new(
            "OpenStack git repository",
            "git.openstack.org/",
            &format!(r"^(?P<root>git\.openstack\.org/{SEGMENT}/[A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*?)(?:\.git)?{SUB_PATH}$"),
            VcsType::Git,
        )
    }

    /// A provider from a user definition.
    pub fn from_definition(definition: &ProviderDefinition) -> Result<Self> {
        Self::new(&definition.name, &definition.prefix, &definition.pattern, definition.vcs_type)
    }
}

#[async_trait]
impl VcsProvider for HostProvider {
    fn name(&self) -> &str {
        self.matcher.name()
    }

    fn could_handle(&self, raw: &RawVcsReference) -> bool {
        self.matcher.could_handle(&raw.id)
    }

    async fn classify(&self, raw: &RawVcsReference) -> Result<VcsReference> {
        let vcs_type = fixed_vcs_type(raw, self.vcs_type)?;
        let captures = self.matcher.captures(raw)?;
        Classified::new(raw, vcs_type, &captures).into_reference(raw)
    }
}
