//! Bitbucket, where a repository may be git or mercurial.
//!
//! The kind is read from the repositories API (`GET <api>/<owner>/<repo>` -> `{"scm": ...}`).
//! Private repositories answer 403; for those every candidate kind is probed by listing refs
//! and the first one that works is taken.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::support::{Classified, IdMatcher, SEGMENT, SUB_PATH};
use super::{MetadataClient, VcsProvider};
use crate::core::GopmError;
use crate::vcs::{RawVcsReference, RepositoryFactory, VcsReference, VcsType};

/// Public repositories API.
pub const BITBUCKET_API: &str = "https://api.bitbucket.org/2.0/repositories";

const PROBE_ORDER: [VcsType; 2] = [VcsType::Git, VcsType::Hg];

#[derive(Debug, Deserialize)]
struct RepositoryMetadata {
    scm: String,
}

/// Provider for `bitbucket.org/<owner>/<repo>`.
pub struct BitbucketProvider {
    matcher: IdMatcher,
    client: Arc<dyn MetadataClient>,
    factory: RepositoryFactory,
    api_base: String,
}

impl BitbucketProvider {
    /// Creates the provider against the public API.
    pub fn new(client: Arc<dyn MetadataClient>, factory: RepositoryFactory) -> Result<Self> {
        Self::with_api_base(client, factory, BITBUCKET_API)
    }

    /// Creates the provider against another API base URL.
    pub fn with_api_base(
        client: Arc<dyn MetadataClient>,
        factory: RepositoryFactory,
        api_base: &str,
    ) -> Result<Self> {
        Ok(Self {
            matcher: IdMatcher::new(
                "Bitbucket",
                Some("bitbucket.org/"),
                &format!(r"^(?P<root>bitbucket\.org/(?P<bitname>{SEGMENT}/{SEGMENT})){SUB_PATH}$"),
            )?,
            client,
            factory,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn detect_vcs_type(&self, raw: &RawVcsReference, bitname: &str) -> Result<VcsType> {
        let url = format!("{}/{bitname}", self.api_base);
        let response = self.client.get(&url).await?;

        if response.status < 400 {
            let metadata: RepositoryMetadata =
                serde_json::from_str(&response.body).map_err(|e| GopmError::NetworkError {
                    operation: format!("decode response of {url}"),
                    reason: e.to_string(),
                })?;
            return metadata.scm.parse::<VcsType>().map_err(|_| {
                GopmError::VcsValidation {
                    message: format!(
                        "Unable to detect version control system for bitbucket.org/ path ({}).",
                        metadata.scm
                    ),
                }
                .into()
            });
        }

        if response.status == 403 {
            for candidate in PROBE_ORDER {
                if self.probe(raw, candidate).await {
                    tracing::debug!("Detected {candidate} for {raw} by probing");
                    return Ok(candidate);
                }
            }
        }

        Err(GopmError::RepositoryLookupFailed {
            url,
            status: response.status,
        }
        .into())
    }

    /// Whether `raw` is reachable as a repository of kind `candidate`.
    async fn probe(&self, raw: &RawVcsReference, candidate: VcsType) -> bool {
        let Ok(reference) = self.classified(raw, candidate) else {
            return false;
        };
        match self.factory.create(reference).is_working().await {
            Ok(working) => working,
            Err(e) => {
                tracing::debug!("Probing {raw} as {candidate} failed: {e:#}");
                false
            }
        }
    }

    fn classified(&self, raw: &RawVcsReference, vcs_type: VcsType) -> Result<VcsReference> {
        let captures = self.matcher.captures(raw)?;
        Classified::new(raw, vcs_type, &captures).into_reference(raw)
    }
}

#[async_trait]
impl VcsProvider for BitbucketProvider {
    fn name(&self) -> &str {
        self.matcher.name()
    }

    fn could_handle(&self, raw: &RawVcsReference) -> bool {
        self.matcher.could_handle(&raw.id)
    }

    async fn classify(&self, raw: &RawVcsReference) -> Result<VcsReference> {
        let captures = self.matcher.captures(raw)?;
        let vcs_type = match raw.vcs_type {
            Some(explicit) => explicit,
            None => {
                let bitname = captures.name("bitname").map(|m| m.as_str()).unwrap_or_default();
                self.detect_vcs_type(raw, bitname).await?
            }
        };
        self.classified(raw, vcs_type)
    }
}
