//! Identifier classification: which host serves an import path, over which VCS, from where.
//!
//! A [`ProviderRegistry`] holds an ordered list of [`VcsProvider`] strategies. The first
//! provider that claims an identifier classifies it; a provider that claims an id but cannot
//! parse it fails the classification instead of passing it on. The default order is
//!
//! 1. GitHub
//! 2. gopkg.in
//! 3. golang.org/x
//! 4. google.golang.org
//! 5. Bitbucket
//! 6. hub.jazz.net
//! 7. git.apache.org
//! 8. git.openstack.org
//! 9. user-declared providers
//! 10. the VCS suffix detector
//!
//! Host providers come before the suffix detector so that dotted ids like `gopkg.in/yaml.v2`
//! are never taken for generic hosts.

mod bitbucket;
mod gopkg;
mod host;
mod http;
mod rewrite;
mod suffix;
pub mod support;

pub use bitbucket::{BITBUCKET_API, BitbucketProvider};
pub use gopkg::GopkgInProvider;
pub use host::{HostProvider, ProviderDefinition};
pub use http::{MetadataClient, MetadataResponse, ReqwestMetadataClient};
pub use rewrite::{PINNED_REF, RewriteProvider};
pub use suffix::SuffixDetectingProvider;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::core::GopmError;
use crate::git::GitTransport;
use crate::vcs::{RawVcsReference, RepositoryFactory, VcsReference, VcsRepository};

/// One hosting convention.
#[async_trait]
pub trait VcsProvider: Send + Sync {
    /// Display name.
    fn name(&self) -> &str;

    /// Whether this provider is responsible for `raw`.
    fn could_handle(&self, raw: &RawVcsReference) -> bool;

    /// Classifies a claimed reference.
    async fn classify(&self, raw: &RawVcsReference) -> Result<VcsReference>;
}

/// Ordered provider list plus the factory turning classifications into repositories.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn VcsProvider>>,
    factory: RepositoryFactory,
}

impl ProviderRegistry {
    /// A registry consulting `providers` in the given order.
    pub fn new(providers: Vec<Box<dyn VcsProvider>>, factory: RepositoryFactory) -> Self {
        Self {
            providers,
            factory,
        }
    }

    /// The built-in providers with `custom` ones inserted before the suffix detector.
    pub fn with_defaults(
        transport: Arc<dyn GitTransport>,
        metadata: Arc<dyn MetadataClient>,
        custom: &[ProviderDefinition],
    ) -> Result<Self> {
        let factory = RepositoryFactory::new(Arc::clone(&transport));
        let mut providers: Vec<Box<dyn VcsProvider>> = vec![
            Box::new(HostProvider::github()?),
            Box::new(GopkgInProvider::new(transport)?),
            Box::new(RewriteProvider::golang_org()?),
            Box::new(RewriteProvider::google_golang_org()?),
            Box::new(BitbucketProvider::new(metadata, factory.clone())?),
            Box::new(HostProvider::hub_jazz()?),
            Box::new(HostProvider::git_apache()?),
            Box::new(HostProvider::git_openstack()?),
        ];
        for definition in custom {
            providers.push(Box::new(HostProvider::from_definition(definition)?));
        }
        providers.push(Box::new(SuffixDetectingProvider::new()?));
        Ok(Self::new(providers, factory))
    }

    /// Provider names in consultation order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// The repository factory.
    pub const fn factory(&self) -> &RepositoryFactory {
        &self.factory
    }

    /// Classifies `raw` with the first provider claiming it.
    pub async fn classify(&self, raw: &RawVcsReference) -> Result<VcsReference> {
        let provider = self.providers.iter().find(|p| p.could_handle(raw)).ok_or_else(|| {
            GopmError::UnclassifiableDependency {
                id: raw.id.clone(),
            }
        })?;
        tracing::trace!("{raw} is handled by {}", provider.name());
        provider.classify(raw).await
    }

    /// Classifies `raw` and creates its repository.
    pub async fn repository_for(&self, raw: &RawVcsReference) -> Result<Box<dyn VcsRepository>> {
        let reference = self.classify(raw).await?;
        Ok(self.factory.create(reference))
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry").field("providers", &self.names()).finish()
    }
}
