//! Freshness ledger: one side file per cached checkout recording the last fetch.
//!
//! Every fetched repository gets a `.vcs-repository-info` JSON document next to its
//! sources:
//!
//! ```json
//! {
//!   "creator": "gopm 0.3.0",
//!   "type": "git",
//!   "id": "github.com/foo/bar",
//!   "uri": "https://github.com/foo/bar.git",
//!   "ref": "v1.2.0",
//!   "fullRef": "4f1c0a...",
//!   "lastUpdatedMillis": 1700000000000
//! }
//! ```
//!
//! The record is consulted before each fetch ([`should_update`]) and overwritten after each
//! successful one. Entries are independent files, so an interrupted run can only ever lose
//! the entry it was writing. A missing or unreadable entry is treated as "never fetched".

mod policy;

pub use policy::UpdatePolicy;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::GopmError;
use crate::utils::fs::{read_json_file, write_json_file};
use crate::vcs::{VcsFullReference, VcsReference, VcsType};

/// Name of the side file stored in each cached checkout.
pub const INFO_FILE_NAME: &str = ".vcs-repository-info";

/// Value of the `creator` field written by this build.
pub fn creator() -> String {
    format!("gopm {}", env!("CARGO_PKG_VERSION"))
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The persisted record of the last successful fetch of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    /// Tool name and version that wrote the entry
    pub creator: String,
    /// VCS kind
    #[serde(rename = "type")]
    pub vcs_type: VcsType,
    /// Canonical id
    pub id: String,
    /// Remote URI fetched from
    pub uri: String,
    /// Requested ref at fetch time, absent for the remote HEAD
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Concrete revision that was checked out
    pub full_ref: String,
    /// When the fetch finished
    pub last_updated_millis: i64,
    /// `false` marks a checkout that automated cleanup must leave alone
    #[serde(default = "default_managed", skip_serializing_if = "is_managed")]
    pub managed: bool,
}

const fn default_managed() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_managed(managed: &bool) -> bool {
    *managed
}

impl RepositoryInfo {
    /// Entry describing a fetch that just completed.
    pub fn for_fetch(full: &VcsFullReference, now_millis: i64) -> Self {
        let reference = full.reference();
        Self {
            creator: creator(),
            vcs_type: reference.vcs_type(),
            id: reference.id().to_string(),
            uri: reference.uri().to_string(),
            reference: reference.reference().map(ToString::to_string),
            full_ref: full.full().to_string(),
            last_updated_millis: now_millis,
            managed: true,
        }
    }
}

/// Path of the side file inside a checkout directory.
pub fn info_file_for(target_dir: &Path) -> PathBuf {
    target_dir.join(INFO_FILE_NAME)
}

/// Reads the entry stored in `target_dir`.
///
/// A missing, unreadable or corrupt file yields `Ok(None)`; corruption is logged. Reading
/// the ledger of a `manual` repository is an illegal state, as those are never fetched.
pub fn load(target_dir: &Path, vcs_type: VcsType) -> Result<Option<RepositoryInfo>> {
    if vcs_type == VcsType::Manual {
        return Err(GopmError::VcsValidation {
            message: format!(
                "Repository in {} is maintained manually and cannot be updated",
                target_dir.display()
            ),
        }
        .into());
    }
    Ok(read_entry(target_dir))
}

/// Reads the entry stored in `target_dir` regardless of kind.
pub fn read_entry(target_dir: &Path) -> Option<RepositoryInfo> {
    let path = info_file_for(target_dir);
    if !path.is_file() {
        return None;
    }
    match read_json_file::<RepositoryInfo>(&path) {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!("Ignoring unreadable ledger entry {}: {e:#}", path.display());
            None
        }
    }
}

/// Whether the checkout in `target_dir` is maintained by hand (`managed: false`).
///
/// Such checkouts are never refreshed by a resolution and never pruned.
pub fn is_hand_maintained(target_dir: &Path) -> bool {
    read_entry(target_dir).is_some_and(|entry| !entry.managed)
}

/// Writes `info` into `target_dir`, replacing any previous entry.
pub fn save(target_dir: &Path, info: &RepositoryInfo) -> Result<()> {
    write_json_file(&info_file_for(target_dir), info, true)
}

/// Whether the checkout described by `entry` must be fetched again for `reference`.
///
/// True when there is no entry, when the requested ref changed, or when the reference's
/// update policy says the entry expired at `now_millis`.
pub fn should_update(entry: Option<&RepositoryInfo>, reference: &VcsReference, now_millis: i64) -> bool {
    let Some(entry) = entry else {
        return true;
    };
    if entry.reference.as_deref() != reference.reference() {
        return true;
    }
    reference.update_policy().update_required(entry.last_updated_millis, now_millis)
}
