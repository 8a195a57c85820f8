//! Git transport: listing remote refs and fetching a single ref into a directory.
//!
//! The resolver never talks to git directly. It goes through the [`GitTransport`] trait so
//! that the VCS layer can be exercised against in-memory fakes; [`GitCli`] is the real
//! implementation built on the system `git` binary via [`GitCommand`].
//!
//! # Fetch strategy
//!
//! A fetch is `git init` + `git fetch --depth 1 <uri> <ref>` + `git checkout FETCH_HEAD`,
//! which works for any advertised ref name (`HEAD`, `refs/tags/...`, `refs/heads/...`, and
//! others) and only transfers a single commit.

pub mod command_builder;

use anyhow::Result;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::path::Path;

use crate::core::GopmError;
use crate::utils::fs::ensure_dir;
pub use command_builder::GitCommand;

/// A ref advertised by a remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRef {
    /// Full ref name, e.g. `refs/tags/v1.2.0` or `HEAD`
    pub name: String,
    /// Object id the ref points to
    pub object_id: String,
}

impl RemoteRef {
    /// Creates a remote ref.
    pub fn new(name: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_id: object_id.into(),
        }
    }
}

fn ref_rank(name: &str) -> u8 {
    if name == "HEAD" {
        0
    } else if name.starts_with("refs/tags/") {
        1
    } else if name.starts_with("refs/heads/") {
        2
    } else {
        3
    }
}

/// Orders refs `HEAD` first, then tags, then branches, then everything else; names compare
/// lexicographically within a group.
pub fn compare_refs(a: &RemoteRef, b: &RemoteRef) -> Ordering {
    ref_rank(&a.name).cmp(&ref_rank(&b.name)).then_with(|| a.name.cmp(&b.name))
}

/// Sorts refs with [`compare_refs`].
pub fn sort_refs(refs: &mut [RemoteRef]) {
    refs.sort_by(compare_refs);
}

/// Parses `git ls-remote` output (`<oid>\t<name>` per line).
///
/// Peeled tag entries (`refs/tags/x^{}`) are dropped; malformed lines are ignored.
pub fn parse_ls_remote(output: &str) -> Vec<RemoteRef> {
    output
        .lines()
        .filter_map(|line| {
            let (object_id, name) = line.trim().split_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() || name.ends_with("^{}") {
                return None;
            }
            Some(RemoteRef::new(name, object_id))
        })
        .collect()
}

/// Splits a git URI whose path continues past the repository (`.../repo.git/sub/dir`) into
/// the clone URI and the sub-path.
///
/// Returns the URI unchanged with an empty sub-path when it has no `.git` path segment.
pub fn split_git_uri(uri: &str) -> (String, String) {
    let path_start = uri
        .find("://")
        .and_then(|scheme_end| uri[scheme_end + 3..].find('/').map(|p| p + scheme_end + 3))
        .unwrap_or(0);
    let path = &uri[path_start..];
    let mut search_from = 0;
    while let Some(found) = path[search_from..].find(".git") {
        let end = search_from + found + ".git".len();
        let rest = &path[end..];
        if rest.is_empty() || rest.starts_with('/') {
            return (uri[..path_start + end].to_string(), rest.to_string());
        }
        search_from = end;
    }
    (uri.to_string(), String::new())
}

/// Low-level git operations the VCS layer needs.
#[async_trait]
pub trait GitTransport: Send + Sync {
    /// Every ref the remote advertises.
    async fn list_remote_refs(&self, uri: &str) -> Result<Vec<RemoteRef>>;

    /// Fetches `ref_name` from `uri` into the empty directory `target`, created when missing,
    /// checks it out and returns the checked-out commit. Git metadata is left in `target/.git`.
    async fn fetch_ref(&self, uri: &str, ref_name: &str, target: &Path) -> Result<String>;
}

/// [`GitTransport`] backed by the system git binary.
#[derive(Debug, Clone, Default)]
pub struct GitCli;

impl GitCli {
    /// Creates the transport.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GitTransport for GitCli {
    async fn list_remote_refs(&self, uri: &str) -> Result<Vec<RemoteRef>> {
        let stdout = GitCommand::ls_remote(uri)
            .with_context(format!("ls-remote {uri}"))
            .execute_stdout()
            .await?;
        Ok(parse_ls_remote(&stdout))
    }

    async fn fetch_ref(&self, uri: &str, ref_name: &str, target: &Path) -> Result<String> {
        ensure_dir(target)?;
        GitCommand::init().current_dir(target).execute_success().await?;
        GitCommand::fetch_shallow(uri, ref_name)
            .current_dir(target)
            .with_context(format!("fetch {uri}@{ref_name}"))
            .execute_success()
            .await?;
        GitCommand::checkout("FETCH_HEAD").current_dir(target).execute_success().await?;
        let revision = GitCommand::current_commit().current_dir(target).execute_stdout().await?;
        if revision.is_empty() {
            return Err(GopmError::FetchFailed {
                uri: uri.to_string(),
                reason: format!("no revision checked out for {ref_name}"),
            }
            .into());
        }
        Ok(revision)
    }
}

/// Whether a usable git binary is on PATH.
pub async fn is_git_installed() -> bool {
    GitCommand::version().execute().await.is_ok()
}
