//! Version control repositories behind one interface.
//!
//! A classified [`VcsReference`] is turned into a [`VcsRepository`] by
//! [`RepositoryFactory`]. Only git is implemented ([`GitVcsRepository`]); mercurial, bazaar,
//! subversion and manual repositories are represented by [`UnsupportedVcsRepository`],
//! whose operations fail with [`GopmError::UnsupportedVcs`](crate::core::GopmError).
//!
//! Fetching is incremental. [`VcsRepository::update_if_required`] consults the freshness
//! ledger and returns `None` when the cached checkout is still fresh;
//! [`VcsRepository::force_update`] empties the checkout directory, downloads, and writes a
//! new ledger entry.

mod git;
mod reference;
mod repository;

pub use git::GitVcsRepository;
pub use reference::{RawVcsReference, VcsFullReference, VcsReference, VcsType};
pub use repository::{UnsupportedVcsRepository, VcsRepository, target_dir_for};

use std::sync::Arc;

use crate::git::GitTransport;

/// Builds repositories for classified references.
#[derive(Clone)]
pub struct RepositoryFactory {
    transport: Arc<dyn GitTransport>,
}

impl RepositoryFactory {
    /// Creates a factory whose git repositories use `transport`.
    pub fn new(transport: Arc<dyn GitTransport>) -> Self {
        Self {
            transport,
        }
    }

    /// The repository implementation matching the reference's kind.
    pub fn create(&self, reference: VcsReference) -> Box<dyn VcsRepository> {
        match reference.vcs_type() {
            VcsType::Git => Box::new(GitVcsRepository::new(reference, Arc::clone(&self.transport))),
            _ => Box::new(UnsupportedVcsRepository::new(reference)),
        }
    }
}

impl std::fmt::Debug for RepositoryFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryFactory").finish_non_exhaustive()
    }
}
