//! In-memory collaborators for exercising the VCS and provider layers without a network.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;

use crate::core::GopmError;
use crate::git::{GitTransport, RemoteRef};
use crate::providers::{MetadataClient, MetadataResponse};

#[derive(Debug, Clone, Default)]
struct FakeRemote {
    refs: Vec<RemoteRef>,
    files: BTreeMap<String, String>,
}

/// A [`GitTransport`] serving remotes registered up front.
///
/// Fetching writes the remote's files into the target together with a `.git/HEAD` marker and
/// records the `(uri, ref)` pair. Unknown URIs fail like an unreachable remote.
#[derive(Debug, Default)]
pub struct FakeTransport {
    remotes: Mutex<HashMap<String, FakeRemote>>,
    fetches: Mutex<Vec<(String, String)>>,
    listings: Mutex<Vec<String>>,
}

impl FakeTransport {
    /// An empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a remote with `(ref name, object id)` pairs and `(path, content)` files.
    pub fn add_remote(&self, uri: &str, refs: &[(&str, &str)], files: &[(&str, &str)]) {
        let remote = FakeRemote {
            refs: refs.iter().map(|(name, oid)| RemoteRef::new(*name, *oid)).collect(),
            files: files.iter().map(|(path, content)| ((*path).to_string(), (*content).to_string())).collect(),
        };
        self.remotes.lock().unwrap().insert(uri.to_string(), remote);
    }

    /// Every `(uri, ref)` fetched so far, in order.
    pub fn fetches(&self) -> Vec<(String, String)> {
        self.fetches.lock().unwrap().clone()
    }

    /// How many fetches hit `uri`.
    pub fn fetch_count(&self, uri: &str) -> usize {
        self.fetches.lock().unwrap().iter().filter(|(u, _)| u == uri).count()
    }

    /// How often refs of `uri` were listed.
    pub fn listings(&self, uri: &str) -> usize {
        self.listings.lock().unwrap().iter().filter(|u| *u == uri).count()
    }

    fn remote(&self, uri: &str) -> Result<FakeRemote> {
        self.remotes.lock().unwrap().get(uri).cloned().ok_or_else(|| {
            GopmError::FetchFailed {
                uri: uri.to_string(),
                reason: "repository not found".to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl GitTransport for FakeTransport {
    async fn list_remote_refs(&self, uri: &str) -> Result<Vec<RemoteRef>> {
        self.listings.lock().unwrap().push(uri.to_string());
        Ok(self.remote(uri)?.refs)
    }

    async fn fetch_ref(&self, uri: &str, ref_name: &str, target: &Path) -> Result<String> {
        let remote = self.remote(uri)?;
        let remote_ref = remote.refs.iter().find(|r| r.name == ref_name).ok_or_else(|| {
            GopmError::FetchFailed {
                uri: uri.to_string(),
                reason: format!("couldn't find remote ref {ref_name}"),
            }
        })?;
        self.fetches.lock().unwrap().push((uri.to_string(), ref_name.to_string()));

        for (path, content) in &remote.files {
            let file = target.join(path);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(file, content)?;
        }
        std::fs::create_dir_all(target.join(".git"))?;
        std::fs::write(target.join(".git").join("HEAD"), &remote_ref.object_id)?;
        Ok(remote_ref.object_id.clone())
    }
}

/// A [`MetadataClient`] answering from canned responses keyed by URL.
#[derive(Debug, Default)]
pub struct FakeMetadataClient {
    responses: Mutex<HashMap<String, MetadataResponse>>,
    requests: Mutex<Vec<String>>,
}

impl FakeMetadataClient {
    /// A client without responses; every request fails with a network error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `url` with `status` and `body`.
    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            MetadataResponse {
                status,
                body: body.to_string(),
            },
        );
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataClient for FakeMetadataClient {
    async fn get(&self, url: &str) -> Result<MetadataResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses.lock().unwrap().get(url).cloned().ok_or_else(|| {
            GopmError::NetworkError {
                operation: format!("GET {url}"),
                reason: "no canned response".to_string(),
            }
            .into()
        })
    }
}
