//! Git-backed [`VcsRepository`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::core::GopmError;
use crate::git::{GitTransport, RemoteRef, sort_refs, split_git_uri};
use crate::utils::fs::remove_dir_all;
use crate::vcs::{VcsFullReference, VcsReference, VcsRepository};

const DEFAULT_REF: &str = "HEAD";

/// A git repository reached through a [`GitTransport`].
///
/// The requested ref is matched against the advertised refs with fixed priority: the literal
/// name, then `refs/tags/<ref>`, then `refs/heads/<ref>`. Without a requested ref the remote
/// `HEAD` is used and must exist.
pub struct GitVcsRepository {
    reference: VcsReference,
    transport: Arc<dyn GitTransport>,
}

impl GitVcsRepository {
    /// Creates a repository for `reference`.
    pub fn new(reference: VcsReference, transport: Arc<dyn GitTransport>) -> Self {
        Self {
            reference,
            transport,
        }
    }

    /// The URI handed to git, with any `<repo>.git/<sub>` suffix removed.
    pub fn clone_uri(&self) -> String {
        split_git_uri(self.reference.uri()).0
    }

    fn requested_ref(&self) -> &str {
        self.reference.reference().unwrap_or(DEFAULT_REF)
    }

    /// Picks the advertised ref matching the requested one.
    pub fn select_ref(&self, refs: &[RemoteRef]) -> Option<RemoteRef> {
        let requested = self.requested_ref();
        let candidates =
            [requested.to_string(), format!("refs/tags/{requested}"), format!("refs/heads/{requested}")];
        candidates
            .iter()
            .find_map(|candidate| refs.iter().find(|r| &r.name == candidate))
            .cloned()
    }

    async fn resolve_remote_ref(&self) -> Result<Option<RemoteRef>> {
        let uri = self.clone_uri();
        tracing::debug!("Listing remote refs of {uri}");
        let mut refs = self.transport.list_remote_refs(&uri).await?;
        sort_refs(&mut refs);
        Ok(self.select_ref(&refs))
    }
}

#[async_trait]
impl VcsRepository for GitVcsRepository {
    fn reference(&self) -> &VcsReference {
        &self.reference
    }

    async fn is_working(&self) -> Result<bool> {
        Ok(self.resolve_remote_ref().await?.is_some())
    }

    async fn download_to(&self, target: &Path) -> Result<VcsFullReference> {
        let uri = self.clone_uri();
        let remote_ref = self.resolve_remote_ref().await?.ok_or_else(|| GopmError::VcsValidation {
            message: format!("Could not find ref {uri}@{}.", self.requested_ref()),
        })?;

        tracing::debug!("Fetching {uri}@{} into {}", remote_ref.name, target.display());
        let revision = self
            .transport
            .fetch_ref(&uri, &remote_ref.name, target)
            .await
            .with_context(|| format!("Cannot fetch {uri}@{} to {}", remote_ref.name, target.display()))?;

        let git_dir = target.join(".git");
        if git_dir.exists() {
            remove_dir_all(&git_dir)?;
        }
        Ok(VcsFullReference::new(self.reference.clone(), revision))
    }
}

impl std::fmt::Debug for GitVcsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitVcsRepository").field("reference", &self.reference).finish_non_exhaustive()
    }
}
