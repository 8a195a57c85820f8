//! Catch-all provider for ids that spell out their VCS kind (`host/path/repo.git/sub`).

use anyhow::Result;
use async_trait::async_trait;

use super::VcsProvider;
use super::support::{Classified, IdMatcher, fixed_vcs_type};
use crate::core::GopmError;
use crate::vcs::{RawVcsReference, VcsReference, VcsType};

/// Claims any id with a `.git`, `.hg`, `.bzr` or `.svn` path segment suffix.
///
/// Must be consulted after every host provider: `gopkg.in/x.v2` has dots too.
#[derive(Debug, Clone)]
pub struct SuffixDetectingProvider {
    matcher: IdMatcher,
}

impl SuffixDetectingProvider {
    /// Creates the provider.
    pub fn new() -> Result<Self> {
        Ok(Self {
            matcher: IdMatcher::new(
                "VCS suffix",
                None,
                r"^(?P<root>(?:[a-z0-9.\-]+\.)+[a-z0-9.\-]+(?::[0-9]+)?(?:/~?[A-Za-z0-9_.\-]+)+?\.(?P<vcs>bzr|git|hg|svn))(?P<subPath>(?:/~?[A-Za-z0-9_.\-]+)*)$",
            )?,
        })
    }
}

#[async_trait]
impl VcsProvider for SuffixDetectingProvider {
    fn name(&self) -> &str {
        self.matcher.name()
    }

    fn could_handle(&self, raw: &RawVcsReference) -> bool {
        self.matcher.could_handle(&raw.id)
    }

    async fn classify(&self, raw: &RawVcsReference) -> Result<VcsReference> {
        let captures = self.matcher.captures(raw)?;
        let detected = captures
            .name("vcs")
            .map(|m| m.as_str())
            .unwrap_or_default()
            .parse::<VcsType>()
            .map_err(|_| GopmError::VcsValidation {
                message: format!("Unable to detect version control system of {raw}."),
            })?;
        let vcs_type = fixed_vcs_type(raw, detected)?;
        Classified::new(raw, vcs_type, &captures).into_reference(raw)
    }
}
