use gopm::cache::{self, DirectoryClass};
use gopm::cli::common::build_resolver;
use gopm::ledger::{self, RepositoryInfo};
use gopm::vcs::{VcsFullReference, VcsReference, VcsType};

use crate::common::{Workspace, entry, relative};

#[tokio::test]
async fn test_orphans_after_resolution_are_deleted() {
    let workspace = Workspace::new();
    let lib = workspace.remote("lib", &[("lib.go", "package lib\n"), ("internal/x/x.go", "package x\n")]);
    workspace.configure(&[entry("example.com/lib", &lib.uri())]);

    let cache_dir = workspace.cache();
    for stale in ["example.com/old/pkg", "other.org/tool"] {
        std::fs::create_dir_all(cache_dir.join(stale)).unwrap();
    }

    let settings = workspace.settings();
    let resolution = build_resolver(&settings, false).unwrap().resolve(&settings.declared(None).unwrap()).await.unwrap();

    let classes = cache::classify_directories(&cache_dir, &resolution.ids).unwrap();
    assert_eq!(classes[&cache_dir.join("example.com")], DirectoryClass::AncestorOfManaged);
    assert_eq!(classes[&cache_dir.join("example.com/lib")], DirectoryClass::Managed);
    assert_eq!(classes[&cache_dir.join("example.com/lib/internal/x")], DirectoryClass::DescendantOfManaged);

    let report = cache::delete_orphans(&cache_dir, &resolution.ids).unwrap();
    assert!(report.is_complete());
    let deleted: Vec<String> = report.deleted.iter().map(|p| relative(&cache_dir, p)).collect();
    assert_eq!(deleted, ["other.org/tool", "other.org", "example.com/old/pkg", "example.com/old"]);
    assert!(cache_dir.join("example.com/lib/internal/x/x.go").is_file());
}

#[test]
fn test_hand_maintained_checkout_survives_delete_orphans() {
    let workspace = Workspace::new();
    let cache_dir = workspace.cache();
    let mine = cache_dir.join("example.com/mine");
    std::fs::create_dir_all(&mine).unwrap();

    let reference = VcsReference::new(VcsType::Git, "example.com/mine", "file:///nowhere").unwrap();
    let mut info = RepositoryInfo::for_fetch(&VcsFullReference::new(reference, "abc123"), 0);
    info.managed = false;
    ledger::save(&mine, &info).unwrap();

    let report = cache::delete_orphans(&cache_dir, &Default::default()).unwrap();
    assert!(report.attempted.is_empty());
    assert!(mine.is_dir());
}
