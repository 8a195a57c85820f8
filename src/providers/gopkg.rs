//! `gopkg.in` major-version redirects.
//!
//! `gopkg.in/pkg.vN` is served by `github.com/go-pkg/pkg` and `gopkg.in/user/pkg.vN` by
//! `github.com/user/pkg`. The ref to fetch is the highest branch or tag named
//! `vN[.MINOR[.PATCH]]` on that repository; a requested version on the dependency is ignored.

use anyhow::Result;
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::sync::Arc;

use super::VcsProvider;
use super::support::{Classified, IdMatcher, SUB_PATH, default_uri, fixed_vcs_type};
use crate::core::GopmError;
use crate::git::{GitTransport, RemoteRef, sort_refs};
use crate::vcs::{RawVcsReference, VcsReference, VcsType};
use crate::version::IntegerVersion;

/// Resolves `gopkg.in` ids against the refs of the backing GitHub repository.
pub struct GopkgInProvider {
    matcher: IdMatcher,
    ref_pattern: Regex,
    transport: Arc<dyn GitTransport>,
}

impl GopkgInProvider {
    /// Creates the provider; refs are listed through `transport`.
    pub fn new(transport: Arc<dyn GitTransport>) -> Result<Self> {
        Ok(Self {
            matcher: IdMatcher::new(
                "gopkg.in",
                Some("gopkg.in/"),
                &format!(
                    r"^(?P<root>gopkg\.in(?P<repo>(?:/[A-Za-z0-9_.\-]+){{1,2}}?)\.v(?P<version>[0-9]{{1,9}})){SUB_PATH}$"
                ),
            )?,
            ref_pattern: Regex::new(
                r"^refs/(?:heads|tags)/v(?P<version>[0-9]{1,9}(?:\.[0-9]{1,9}(?:\.[0-9]{1,9})?)?)$",
            )?,
            transport,
        })
    }

    /// `github.com/go-<pkg>/<pkg>` for one segment, `github.com/<user>/<pkg>` for two.
    fn hosting_root(captures: &Captures<'_>) -> String {
        let repo = captures.name("repo").map(|m| m.as_str()).unwrap_or_default();
        let parts: Vec<&str> = repo.split('/').filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            [user, pkg] => format!("github.com/{user}/{pkg}"),
            [pkg] => format!("github.com/go-{pkg}/{pkg}"),
            _ => format!("github.com{repo}"),
        }
    }

    /// Picks the ref with the highest version whose major equals `major`.
    ///
    /// Refs are walked in [`sort_refs`] order so that a tag wins over a branch carrying the same
    /// version.
    pub fn select_ref(&self, id: &str, major: u32, refs: &[RemoteRef]) -> Result<String> {
        let mut sorted = refs.to_vec();
        sort_refs(&mut sorted);

        let mut best: Option<(IntegerVersion, &RemoteRef)> = None;
        for candidate in &sorted {
            let Some(version) = self
                .ref_pattern
                .captures(&candidate.name)
                .and_then(|c| c.name("version"))
                .and_then(|v| v.as_str().parse::<IntegerVersion>().ok())
            else {
                continue;
            };
            if version.major() != major {
                continue;
            }
            if best.as_ref().is_none_or(|(current, _)| version > *current) {
                best = Some((version, candidate));
            }
        }

        best.map(|(_, r)| r.name.clone()).ok_or_else(|| {
            GopmError::IllegalReference {
                message: format!("Version {major} of {id} does not exist."),
            }
            .into()
        })
    }
}

#[async_trait]
impl VcsProvider for GopkgInProvider {
    fn name(&self) -> &str {
        self.matcher.name()
    }

    fn could_handle(&self, raw: &RawVcsReference) -> bool {
        self.matcher.could_handle(&raw.id)
    }

    async fn classify(&self, raw: &RawVcsReference) -> Result<VcsReference> {
        let vcs_type = fixed_vcs_type(raw, VcsType::Git)?;
        let captures = self.matcher.captures(raw)?;
        let major = captures
            .name("version")
            .and_then(|v| v.as_str().parse::<u32>().ok())
            .ok_or_else(|| GopmError::IllegalReference {
                message: format!("No major version in {}.", raw.id),
            })?;

        let mut classified = Classified::new(raw, vcs_type, &captures);
        classified.root = Self::hosting_root(&captures);

        let remote = default_uri(&classified.root, vcs_type);
        tracing::debug!("Fetching remote refs for {} from {remote}", raw.id);
        let refs = self.transport.list_remote_refs(&remote).await?;
        classified.reference = Some(self.select_ref(&classified.id, major, &refs)?);

        classified.into_reference(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeTransport;

    fn provider(transport: FakeTransport) -> GopkgInProvider {
        GopkgInProvider::new(Arc::new(transport)).unwrap()
    }

    fn refs(names: &[&str]) -> Vec<RemoteRef> {
        names.iter().map(|n| RemoteRef::new(*n, "x")).collect()
    }

    #[test]
    fn test_selects_highest_matching_major() {
        let provider = provider(FakeTransport::new());
        let refs = refs(&["refs/tags/v1.0.0", "refs/tags/v1.2.0", "refs/tags/v2.0.0"]);
        assert_eq!(provider.select_ref("gopkg.in/x.v1", 1, &refs).unwrap(), "refs/tags/v1.2.0");
        assert_eq!(provider.select_ref("gopkg.in/x.v2", 2, &refs).unwrap(), "refs/tags/v2.0.0");
    }

    #[test]
    fn test_missing_major_is_illegal_reference() {
        let provider = provider(FakeTransport::new());
        let refs = refs(&["refs/tags/v1.0.0", "refs/tags/v1.2.0", "refs/tags/v2.0.0"]);
        let error = provider.select_ref("gopkg.in/x.v5", 5, &refs).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<GopmError>(),
            Some(GopmError::IllegalReference { message }) if message == "Version 5 of gopkg.in/x.v5 does not exist."
        ));
    }

    #[test]
    fn test_tag_wins_over_branch_with_same_version() {
        let provider = provider(FakeTransport::new());
        let refs = refs(&["refs/heads/v2", "refs/tags/v2", "refs/heads/master", "refs/tags/v2.x"]);
        assert_eq!(provider.select_ref("gopkg.in/x.v2", 2, &refs).unwrap(), "refs/tags/v2");
    }

    #[tokio::test]
    async fn test_single_segment_form() {
        let transport = FakeTransport::new();
        transport.add_remote(
            "https://github.com/go-yaml/yaml.git",
            &[("HEAD", "a"), ("refs/heads/v2", "b"), ("refs/tags/v2.1.0", "c"), ("refs/tags/v3.0.0", "d")],
            &[],
        );
        let provider = provider(transport);
        let raw = RawVcsReference::new("gopkg.in/yaml.v2").with_reference(Some("ignored".into()));

        let reference = provider.classify(&raw).await.unwrap();
        assert_eq!(reference.id(), "gopkg.in/yaml.v2");
        assert_eq!(reference.root(), "github.com/go-yaml/yaml");
        assert_eq!(reference.uri(), "https://github.com/go-yaml/yaml.git");
        assert_eq!(reference.reference(), Some("refs/tags/v2.1.0"));
        assert_eq!(reference.sub_path(), None);
    }

    #[tokio::test]
    async fn test_two_segment_form_with_sub_path() {
        let transport = FakeTransport::new();
        transport.add_remote("https://github.com/foo/bar.git", &[("refs/tags/v3", "a")], &[]);
        let provider = provider(transport);

        let reference = provider.classify(&RawVcsReference::new("gopkg.in/foo/bar.v3/sub")).await.unwrap();
        assert_eq!(reference.id(), "gopkg.in/foo/bar.v3");
        assert_eq!(reference.root(), "github.com/foo/bar");
        assert_eq!(reference.sub_path(), Some("/sub"));
    }

    #[tokio::test]
    async fn test_id_without_version_is_invalid() {
        let provider = provider(FakeTransport::new());
        assert!(provider.classify(&RawVcsReference::new("gopkg.in/yaml")).await.is_err());
    }
}
