//! Cache reconciliation.
//!
//! The dependency cache holds one checkout per canonical id, laid out by the id's path
//! segments (`<cache>/github.com/foo/bar`). After a resolution, directories that belong to
//! no known id are orphans and can be deleted.
//!
//! Every directory below the cache root gets a [`DirectoryClass`]:
//!
//! ```text
//! <cache>/
//! ├── github.com/              AncestorOfManaged
//! │   ├── foo/bar/             Managed            (known id "github.com/foo/bar")
//! │   │   └── internal/pkg/    DescendantOfManaged
//! │   └── old/                 Unknown
//! │       └── lib/             Unknown            -> orphan
//! ```
//!
//! An orphan is an unknown directory that holds files or has no subdirectories. Unknown
//! directories made only of other unknown directories are path segments; they are removed
//! once the orphans below them are gone.
//!
//! Checkouts whose ledger entry says `managed: false` count as managed whatever the known
//! ids are; they are maintained by hand.

pub mod lock;

pub use lock::{CacheLock, LOCK_FILE_NAME};

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::ledger;
use crate::utils::platform::relative_slash_path;

/// Relation of a cache directory to the known dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectoryClass {
    /// Related to no known dependency
    Unknown,
    /// The checkout of a known dependency
    Managed,
    /// On the path from the cache root to a checkout
    AncestorOfManaged,
    /// Inside a checkout
    DescendantOfManaged,
}

/// What a deletion pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// Every path a deletion was attempted on, in deletion order
    pub attempted: Vec<PathBuf>,
    /// Paths that are gone afterwards
    pub deleted: Vec<PathBuf>,
    /// Paths that could not be deleted with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl DeletionReport {
    /// Whether every attempted deletion succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn delete(&mut self, path: &Path) {
        self.attempted.push(path.to_path_buf());
        let result = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        match result {
            Ok(()) => {
                tracing::info!("Deleted {}", path.display());
                self.deleted.push(path.to_path_buf());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.deleted.push(path.to_path_buf());
            }
            Err(e) => {
                tracing::warn!("Could not delete {}: {e}", path.display());
                self.failed.push((path.to_path_buf(), e.to_string()));
            }
        }
    }
}

/// Classifies every directory below `root`. A missing root has no directories.
pub fn classify_directories(root: &Path, known_ids: &BTreeSet<String>) -> Result<BTreeMap<PathBuf, DirectoryClass>> {
    let mut classes = BTreeMap::new();
    if !root.is_dir() {
        return Ok(classes);
    }

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk dependency cache {}", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.into_path();
        let id = relative_slash_path(root, &dir).unwrap_or_default();

        if known_ids.contains(&id) || ledger::is_hand_maintained(&dir) {
            classes.insert(dir.clone(), DirectoryClass::Managed);
            for ancestor in dir.ancestors().skip(1).take_while(|a| *a != root) {
                let class = classes.entry(ancestor.to_path_buf()).or_insert(DirectoryClass::Unknown);
                if *class == DirectoryClass::Unknown {
                    *class = DirectoryClass::AncestorOfManaged;
                }
            }
            continue;
        }

        let inside_checkout = dir
            .ancestors()
            .skip(1)
            .take_while(|a| *a != root)
            .any(|a| classes.get(a) == Some(&DirectoryClass::Managed));
        if inside_checkout {
            classes.insert(dir, DirectoryClass::DescendantOfManaged);
        } else {
            classes.entry(dir).or_insert(DirectoryClass::Unknown);
        }
    }
    Ok(classes)
}

fn holds_content(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut entries = entries.filter_map(Result::ok).peekable();
            entries.peek().is_none() || entries.any(|e| e.file_type().is_ok_and(|t| !t.is_dir()))
        }
        Err(_) => true,
    }
}

/// Unknown directories in deletion order: reverse lexicographic, so children come before
/// their parents.
fn unknown_directories(root: &Path, known_ids: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    let mut unknown: Vec<PathBuf> = classify_directories(root, known_ids)?
        .into_iter()
        .filter(|(_, class)| *class == DirectoryClass::Unknown)
        .map(|(dir, _)| dir)
        .collect();
    unknown.reverse();
    Ok(unknown)
}

/// Orphaned directories below `root`, deepest-first.
pub fn find_orphans(root: &Path, known_ids: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    Ok(unknown_directories(root, known_ids)?.into_iter().filter(|dir| holds_content(dir)).collect())
}

/// Every directory [`delete_orphans`] would remove, in deletion order: the orphans and the
/// unknown path segments that end up empty once they are gone.
pub fn deletion_plan(root: &Path, known_ids: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    let mut plan: Vec<PathBuf> = Vec::new();
    for dir in unknown_directories(root, known_ids)? {
        let emptied = || {
            std::fs::read_dir(&dir).is_ok_and(|entries| {
                entries.filter_map(Result::ok).all(|entry| plan.contains(&entry.path()))
            })
        };
        if holds_content(&dir) || emptied() {
            plan.push(dir);
        }
    }
    Ok(plan)
}

/// Deletes the orphans below `root`, then the unknown directories left empty by them.
///
/// Failures are logged and reported per path; they never stop the pass.
pub fn delete_orphans(root: &Path, known_ids: &BTreeSet<String>) -> Result<DeletionReport> {
    let mut report = DeletionReport::default();
    // Checked as the pass goes: a path segment is empty once its children are gone.
    for dir in unknown_directories(root, known_ids)? {
        if holds_content(&dir) {
            tracing::debug!("Deleting unknown dependency in {}", dir.display());
            report.delete(&dir);
        }
    }
    Ok(report)
}

/// Deletes everything below `root` except the lock file.
pub fn delete_all(root: &Path) -> Result<DeletionReport> {
    let mut report = DeletionReport::default();
    if !root.is_dir() {
        return Ok(report);
    }
    let mut entries: Vec<PathBuf> = std::fs::read_dir(root)
        .with_context(|| format!("Failed to read dependency cache {}", root.display()))?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name() != LOCK_FILE_NAME)
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    entries.reverse();
    for entry in entries {
        report.delete(&entry);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RepositoryInfo;
    use crate::vcs::{VcsFullReference, VcsReference, VcsType};
    use tempfile::TempDir;

    fn tree(dirs: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for dir in dirs {
            std::fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        temp
    }

    fn ids(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    fn relative(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| relative_slash_path(root, p).unwrap()).collect()
    }

    #[test]
    fn test_classification() {
        let temp = tree(&["known/repo/internal/pkg", "unknown/orphan"]);
        let root = temp.path();
        let classes = classify_directories(root, &ids(&["known/repo"])).unwrap();

        let class_of = |p: &str| classes[&root.join(p)];
        assert_eq!(class_of("known"), DirectoryClass::AncestorOfManaged);
        assert_eq!(class_of("known/repo"), DirectoryClass::Managed);
        assert_eq!(class_of("known/repo/internal"), DirectoryClass::DescendantOfManaged);
        assert_eq!(class_of("known/repo/internal/pkg"), DirectoryClass::DescendantOfManaged);
        assert_eq!(class_of("unknown"), DirectoryClass::Unknown);
        assert_eq!(class_of("unknown/orphan"), DirectoryClass::Unknown);
    }

    #[test]
    fn test_orphans_are_deepest_first() {
        let temp = tree(&["known/repo/internal/pkg", "unknown/orphan"]);
        let root = temp.path();
        let orphans = find_orphans(root, &ids(&["known/repo"])).unwrap();
        assert_eq!(relative(root, &orphans), ["unknown/orphan"]);
        assert!(!orphans.contains(&root.join("known/repo/internal/pkg")));
    }

    #[test]
    fn test_unknown_directory_with_files_is_orphan() {
        let temp = tree(&["other.org/tool/cmd"]);
        let root = temp.path();
        std::fs::write(root.join("other.org/tool/tool.go"), "package tool").unwrap();

        let orphans = find_orphans(root, &BTreeSet::new()).unwrap();
        assert_eq!(relative(root, &orphans), ["other.org/tool/cmd", "other.org/tool"]);

        let report = delete_orphans(root, &BTreeSet::new()).unwrap();
        assert_eq!(relative(root, &report.attempted), ["other.org/tool/cmd", "other.org/tool", "other.org"]);
        assert!(!root.join("other.org").exists());
    }

    #[test]
    fn test_sibling_of_known_id_is_orphan() {
        let temp = tree(&["github.com/foo/bar", "github.com/foo/baz", "github.com/old"]);
        let root = temp.path();
        let orphans = find_orphans(root, &ids(&["github.com/foo/bar"])).unwrap();
        assert_eq!(relative(root, &orphans), ["github.com/old", "github.com/foo/baz"]);
    }

    #[test]
    fn test_hand_maintained_checkouts_are_kept() {
        let temp = tree(&["github.com/mine/tool/cmd", "github.com/gone/lib"]);
        let root = temp.path();
        let reference =
            VcsReference::new(VcsType::Git, "github.com/mine/tool", "https://github.com/mine/tool.git").unwrap();
        let mut info = RepositoryInfo::for_fetch(&VcsFullReference::new(reference, "abc"), 0);
        info.managed = false;
        ledger::save(&root.join("github.com/mine/tool"), &info).unwrap();

        let orphans = find_orphans(root, &BTreeSet::new()).unwrap();
        assert_eq!(relative(root, &orphans), ["github.com/gone/lib"]);
    }

    #[test]
    fn test_delete_orphans() {
        let temp = tree(&["known/repo/internal/pkg", "unknown/orphan"]);
        let root = temp.path();
        std::fs::write(root.join("unknown/orphan/file.go"), "package orphan").unwrap();

        let report = delete_orphans(root, &ids(&["known/repo"])).unwrap();
        assert!(report.is_complete());
        assert_eq!(relative(root, &report.attempted), ["unknown/orphan", "unknown"]);
        assert_eq!(report.deleted, report.attempted);
        assert!(!root.join("unknown").exists());
        assert!(root.join("known/repo/internal/pkg").is_dir());
    }

    #[test]
    fn test_deletion_plan_matches_deletion() {
        let temp = tree(&["known/repo", "other.org/tool/cmd", "example.com/old/pkg", "shared/keep"]);
        let root = temp.path();
        std::fs::write(root.join("other.org/tool/tool.go"), "package tool").unwrap();
        std::fs::write(root.join("shared/README"), "").unwrap();
        let known = ids(&["known/repo"]);

        let plan = deletion_plan(root, &known).unwrap();
        assert_eq!(
            relative(root, &plan),
            [
                "shared/keep",
                "shared",
                "other.org/tool/cmd",
                "other.org/tool",
                "other.org",
                "example.com/old/pkg",
                "example.com/old",
                "example.com",
            ]
        );
        assert!(find_orphans(root, &known).unwrap().len() < plan.len());

        let report = delete_orphans(root, &known).unwrap();
        assert_eq!(report.attempted, plan);
        assert!(root.join("known/repo").is_dir());
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nothing");
        assert!(find_orphans(&missing, &BTreeSet::new()).unwrap().is_empty());
        assert!(delete_all(&missing).unwrap().attempted.is_empty());
    }

    #[test]
    fn test_delete_all_keeps_lock_file() {
        let temp = tree(&["github.com/a/b", "golang.org/x/net"]);
        let root = temp.path();
        std::fs::write(root.join(LOCK_FILE_NAME), "").unwrap();
        std::fs::write(root.join("stray.txt"), "").unwrap();

        let report = delete_all(root).unwrap();
        assert_eq!(relative(root, &report.attempted), ["stray.txt", "golang.org", "github.com"]);
        assert!(root.join(LOCK_FILE_NAME).exists());
        assert_eq!(std::fs::read_dir(root).unwrap().count(), 1);
    }
}
