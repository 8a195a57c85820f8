//! Vanity import paths mirrored on GitHub and pinned to `master`.

use anyhow::Result;
use async_trait::async_trait;
use regex::Captures;

use super::VcsProvider;
use super::support::{Classified, IdMatcher, SEGMENT, SUB_PATH, fixed_vcs_type};
use crate::vcs::{RawVcsReference, VcsReference, VcsType};

/// Branch every rewritten repository is fetched from.
pub const PINNED_REF: &str = "master";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mirror {
    /// `golang.org/x/<repo>` -> `github.com/golang/<repo>`
    GolangOrgX,
    /// `google.golang.org/<repo>` -> a handful of known repositories, else `github.com/golang/<repo>`
    GoogleGolangOrg,
}

/// Provider rewriting a vanity path to its hosting repository.
///
/// The canonical id stays the vanity root; the requested version is always replaced by
/// [`PINNED_REF`].
#[derive(Debug, Clone)]
pub struct RewriteProvider {
    matcher: IdMatcher,
    mirror: Mirror,
}

impl RewriteProvider {
    /// `golang.org/x/...`
    pub fn golang_org() -> Result<Self> {
        Ok(Self {
            matcher: IdMatcher::new(
                "golang.org/x",
                Some("golang.org/"),
                &format!(r"^(?P<root>golang\.org/x/(?P<repo>{SEGMENT})){SUB_PATH}$"),
            )?,
            mirror: Mirror::GolangOrgX,
        })
    }

    /// `google.golang.org/...`
    pub fn google_golang_org() -> Result<Self> {
        Ok(Self {
            matcher: IdMatcher::new(
                "google.golang.org",
                Some("google.golang.org/"),
                &format!(r"^(?P<root>google\.golang\.org/(?P<repo>{SEGMENT})){SUB_PATH}$"),
            )?,
            mirror: Mirror::GoogleGolangOrg,
        })
    }

    fn hosting_root(&self, captures: &Captures<'_>) -> String {
        let repo = captures.name("repo").map(|m| m.as_str()).unwrap_or_default();
        match (self.mirror, repo) {
            (Mirror::GoogleGolangOrg, "api") => "github.com/google/google-api-go-client".to_string(),
            (Mirror::GoogleGolangOrg, "code") => "code.googlesource.com/gocloud-legacy".to_string(),
            (Mirror::GoogleGolangOrg, "grpc") => "github.com/grpc/grpc-go".to_string(),
            _ => format!("github.com/golang/{repo}"),
        }
    }
}

#[async_trait]
impl VcsProvider for RewriteProvider {
    fn name(&self) -> &str {
        self.matcher.name()
    }

    fn could_handle(&self, raw: &RawVcsReference) -> bool {
        self.matcher.could_handle(&raw.id)
    }

    async fn classify(&self, raw: &RawVcsReference) -> Result<VcsReference> {
        let vcs_type = fixed_vcs_type(raw, VcsType::Git)?;
        let captures = self.matcher.captures(raw)?;
        let mut classified = Classified::new(raw, vcs_type, &captures);
        classified.root = self.hosting_root(&captures);
        classified.reference = Some(PINNED_REF.to_string());
        classified.into_reference(raw)
    }
}
