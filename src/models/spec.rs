//! Declared dependencies as written in `gopm.toml`.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::Dependency;
use crate::core::GopmError;
use crate::ledger::UpdatePolicy;
use crate::vcs::VcsType;

fn is_notation_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '/')
}

/// Splits `group[:version]`.
///
/// Both parts may only contain ASCII letters, digits, `.`, `-`, `_` and `/`; the group must not
/// be empty, and a version must follow the colon when one is present.
pub fn parse_notation(notation: &str) -> Result<(String, Option<String>), GopmError> {
    let invalid = || GopmError::InvalidNotation {
        value: notation.to_string(),
    };
    let (group, version) = match notation.trim().split_once(':') {
        Some((group, version)) => (group, Some(version)),
        None => (notation.trim(), None),
    };
    if group.is_empty() || !group.chars().all(is_notation_char) {
        return Err(invalid());
    }
    if let Some(version) = version
        && (version.is_empty() || !version.chars().all(is_notation_char))
    {
        return Err(invalid());
    }
    Ok((group.to_string(), version.map(ToString::to_string)))
}

/// One entry of a `[dependencies.<configuration>]` list.
///
/// ```toml
/// [dependencies]
/// build = [
///     "github.com/pkg/errors:v0.9.1",
///     { group = "bitbucket.org/team/lib", type = "git", update_policy = "daily" },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// `group[:version]`
    Notation(String),
    /// Table form with overrides
    Detailed(DetailedDependency),
}

/// Table form of a declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedDependency {
    /// Import path
    pub group: String,
    /// Pinned tag, branch or ref
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Repository URI overriding the derived one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// VCS kind overriding detection
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub vcs_type: Option<VcsType>,
    /// Refresh policy overriding the project default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_policy: Option<UpdatePolicy>,
}

impl DependencySpec {
    /// The explicit dependency this entry declares, with `default_policy` unless it sets its own.
    pub fn to_dependency(&self, default_policy: UpdatePolicy) -> Result<Dependency, GopmError> {
        match self {
            Self::Notation(notation) => {
                let (group, version) = parse_notation(notation)?;
                Ok(Dependency::explicit(group).with_version(version).with_update_policy(default_policy))
            }
            Self::Detailed(detailed) => {
                let notation = match &detailed.version {
                    Some(version) => format!("{}:{version}", detailed.group),
                    None => detailed.group.clone(),
                };
                let (group, version) = parse_notation(&notation)?;
                Ok(Dependency::explicit(group)
                    .with_version(version)
                    .with_uri(detailed.uri.clone())
                    .with_type(detailed.vcs_type)
                    .with_update_policy(detailed.update_policy.unwrap_or(default_policy)))
            }
        }
    }
}
