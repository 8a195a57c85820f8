use gopm::git::{GitCli, GitTransport};
use gopm::ledger::{self, UpdatePolicy};
use gopm::vcs::{RepositoryFactory, VcsReference, VcsType};
use std::sync::Arc;

use crate::common::Workspace;

#[tokio::test]
async fn test_list_remote_refs_of_local_repository() {
    let workspace = Workspace::new();
    let remote = workspace.remote("lib", &[("lib.go", "package lib\n")]);
    remote.tag("v1.0.0").unwrap();
    remote.branch("develop").unwrap();
    let head = remote.rev_parse_head().unwrap();

    let refs = GitCli::new().list_remote_refs(&remote.uri()).await.unwrap();
    let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"HEAD"));
    assert!(names.contains(&"refs/heads/master"));
    assert!(names.contains(&"refs/heads/develop"));
    assert!(names.contains(&"refs/tags/v1.0.0"));
    assert!(refs.iter().all(|r| r.object_id == head));
}

#[tokio::test]
async fn test_fetch_ref_checks_out_the_revision() {
    let workspace = Workspace::new();
    let remote = workspace.remote("lib", &[("lib.go", "package lib\n"), ("sub/sub.go", "package sub\n")]);
    let head = remote.rev_parse_head().unwrap();
    let target = workspace.project.join("checkouts/lib");
    assert!(!target.exists());

    let revision = GitCli::new().fetch_ref(&remote.uri(), "HEAD", &target).await.unwrap();
    assert_eq!(revision, head);
    assert!(target.join("lib.go").is_file());
    assert!(target.join("sub/sub.go").is_file());
}

#[tokio::test]
async fn test_unreachable_remote_fails() {
    let workspace = Workspace::new();
    let missing = format!("file://{}", workspace.remotes.join("missing").display());
    assert!(GitCli::new().list_remote_refs(&missing).await.is_err());
}

#[tokio::test]
async fn test_repository_writes_ledger_and_strips_git_dir() {
    let workspace = Workspace::new();
    let remote = workspace.remote("lib", &[("lib.go", "package lib\n")]);
    remote.tag("v1.0.0").unwrap();
    let head = remote.rev_parse_head().unwrap();

    let reference = VcsReference::new(VcsType::Git, "example.com/lib", remote.uri())
        .unwrap()
        .with_reference(Some("v1.0.0".into()))
        .with_update_policy(UpdatePolicy::Never);
    let repository = RepositoryFactory::new(Arc::new(GitCli::new())).create(reference);
    let cache = workspace.cache();

    let fetched = repository.update_if_required(&cache).await.unwrap().unwrap();
    assert_eq!(fetched.full(), head);

    let checkout = cache.join("example.com/lib");
    assert!(checkout.join("lib.go").is_file());
    assert!(!checkout.join(".git").exists());

    let entry = ledger::load(&checkout, VcsType::Git).unwrap().unwrap();
    assert_eq!(entry.id, "example.com/lib");
    assert_eq!(entry.reference.as_deref(), Some("v1.0.0"));
    assert_eq!(entry.full_ref, head);
    assert!(entry.managed);

    assert!(repository.update_if_required(&cache).await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_tag_is_validation_error() {
    let workspace = Workspace::new();
    let remote = workspace.remote("lib", &[("lib.go", "package lib\n")]);
    let reference = VcsReference::new(VcsType::Git, "example.com/lib", remote.uri())
        .unwrap()
        .with_reference(Some("v9.9.9".into()));
    let repository = RepositoryFactory::new(Arc::new(GitCli::new())).create(reference);

    let error = repository.update_if_required(&workspace.cache()).await.unwrap_err();
    assert!(format!("{error:#}").contains("v9.9.9"));
    assert!(ledger::read_entry(&workspace.cache().join("example.com/lib")).is_none());
}
