use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::GopmError;
use crate::ledger::{self, RepositoryInfo};
use crate::utils::fs::{empty_dir, ensure_dir};
use crate::vcs::{VcsFullReference, VcsReference};

/// Directory of a reference's checkout below `base` (`<base>/<id segments>`).
pub fn target_dir_for(base: &Path, reference: &VcsReference) -> PathBuf {
    reference.id().split('/').filter(|segment| !segment.is_empty()).fold(base.to_path_buf(), |path, segment| path.join(segment))
}

/// A remote repository that can be fetched into a local cache.
#[async_trait]
pub trait VcsRepository: Send + Sync {
    /// The reference this repository was created for.
    fn reference(&self) -> &VcsReference;

    /// Whether the remote is reachable and advertises the requested ref.
    ///
    /// A missing ref yields `Ok(false)`; transport failures are errors.
    async fn is_working(&self) -> Result<bool>;

    /// Downloads the requested ref into `target`, which exists and is empty.
    async fn download_to(&self, target: &Path) -> Result<VcsFullReference>;

    /// Fetches into `<base>/<id>` unless the ledger entry there is still fresh.
    ///
    /// Returns `None` when nothing had to be done. Hand-maintained checkouts are left alone.
    async fn update_if_required(&self, base: &Path) -> Result<Option<VcsFullReference>> {
        let reference = self.reference();
        let target = target_dir_for(base, reference);
        let entry = ledger::load(&target, reference.vcs_type())?;
        if entry.as_ref().is_some_and(|entry| !entry.managed) {
            tracing::info!("Keeping hand-maintained checkout of {reference} in {}", target.display());
            return Ok(None);
        }
        if !ledger::should_update(entry.as_ref(), reference, ledger::now_millis()) {
            tracing::debug!("Checkout of {reference} in {} is up to date", target.display());
            return Ok(None);
        }
        self.force_update(base).await.map(Some)
    }

    /// Empties `<base>/<id>`, downloads into it and records a fresh ledger entry.
    ///
    /// Unconditional: a hand-maintained checkout is replaced and becomes managed.
    async fn force_update(&self, base: &Path) -> Result<VcsFullReference> {
        let reference = self.reference();
        let target = target_dir_for(base, reference);
        ensure_dir(&target)
            .with_context(|| format!("Could not create target directory for {reference}"))?;
        empty_dir(&target)
            .with_context(|| format!("Could not empty target directory for {reference}"))?;

        let full = self.download_to(&target).await?;

        ledger::save(&target, &RepositoryInfo::for_fetch(&full, ledger::now_millis()))
            .with_context(|| format!("Could not record fetch of {reference}"))?;
        tracing::debug!("Fetched {full} into {}", target.display());
        Ok(full)
    }
}

/// Stand-in for VCS kinds gopm cannot fetch (hg, bzr, svn, manual).
#[derive(Debug, Clone)]
pub struct UnsupportedVcsRepository {
    reference: VcsReference,
}

impl UnsupportedVcsRepository {
    /// Wraps a reference of an unsupported kind.
    pub const fn new(reference: VcsReference) -> Self {
        Self {
            reference,
        }
    }

    fn unsupported(&self, operation: &str) -> anyhow::Error {
        GopmError::UnsupportedVcs {
            vcs_type: self.reference.vcs_type().to_string(),
            operation: operation.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl VcsRepository for UnsupportedVcsRepository {
    fn reference(&self) -> &VcsReference {
        &self.reference
    }

    async fn is_working(&self) -> Result<bool> {
        Err(self.unsupported("is-working"))
    }

    async fn download_to(&self, _target: &Path) -> Result<VcsFullReference> {
        Err(self.unsupported("download"))
    }

    async fn update_if_required(&self, _base: &Path) -> Result<Option<VcsFullReference>> {
        Err(self.unsupported("update"))
    }

    async fn force_update(&self, _base: &Path) -> Result<VcsFullReference> {
        Err(self.unsupported("update"))
    }
}
