use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::{Workspace, entry};

fn gopm(workspace: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("gopm").unwrap();
    cmd.arg("--project").arg(&workspace.project).env_remove("GOPM_CACHE_DIR").env_remove("GOPM_CONFIG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("gopm")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("prune"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("scan"));
}

#[test]
fn test_classify_github_sub_package() {
    let workspace = Workspace::new();
    gopm(&workspace)
        .args(["classify", "github.com/foo/bar/baz", "--version", "v1.2.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("github.com/foo/bar"))
        .stdout(predicate::str::contains("https://github.com/foo/bar.git"))
        .stdout(predicate::str::contains("v1.2.0"))
        .stdout(predicate::str::contains("/baz"));
}

#[test]
fn test_classify_unknown_host_fails() {
    let workspace = Workspace::new();
    gopm(&workspace)
        .args(["classify", "nohost/thing"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nohost/thing"));
}

#[test]
fn test_scan_prints_sorted_imports() {
    let workspace = Workspace::new();
    workspace.write("gopm.toml", "[dependencies]\nscanner = \"regex\"\n");
    workspace.write("a.go", "package a\n\nimport (\n\t\"os\"\n\t\"github.com/z/z\"\n)\n");
    workspace.write("b.go", "package b\n\nimport \"github.com/a/a\"\nimport \"./local\"\n");

    gopm(&workspace)
        .current_dir(&workspace.project)
        .args(["scan", "a.go", "b.go"])
        .assert()
        .success()
        .stdout("github.com/a/a\ngithub.com/z/z\nos\n");
}

#[test]
fn test_invalid_configuration_is_reported() {
    let workspace = Workspace::new();
    workspace.write("gopm.toml", "[dependencies]\nupdate_policy = \"sometimes\"\n");
    gopm(&workspace)
        .arg("get")
        .assert()
        .failure()
        .stderr(predicate::str::contains("gopm.toml"));
}

#[test]
fn test_get_fetches_and_prunes() {
    let workspace = Workspace::new();
    let lib = workspace.remote("lib", &[("lib.go", "package lib\n")]);
    workspace.configure(&[entry("example.com/lib", &lib.uri())]);
    let cache = workspace.project.join("deps");
    std::fs::create_dir_all(cache.join("example.com/stale")).unwrap();

    gopm(&workspace)
        .env("GOPM_CACHE_DIR", &cache)
        .arg("get")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com/lib: downloaded"))
        .stdout(predicate::str::contains("example.com/stale"));

    assert!(cache.join("example.com/lib/lib.go").is_file());
    assert!(!cache.join("example.com/stale").exists());
    assert!(!workspace.cache().exists());

    gopm(&workspace)
        .env("GOPM_CACHE_DIR", &cache)
        .arg("get")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com/lib: already satisfied"));
}

#[test]
fn test_prune_dry_run_and_clean_all() {
    let workspace = Workspace::new();
    let lib = workspace.remote("lib", &[("lib.go", "package lib\n")]);
    workspace.configure(&[entry("example.com/lib", &lib.uri())]);
    gopm(&workspace).arg("get").assert().success();

    let cache = workspace.cache();
    std::fs::create_dir_all(cache.join("other.org/tool")).unwrap();

    gopm(&workspace)
        .args(["prune", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would delete"))
        .stdout(predicate::str::contains("other.org/tool\n"))
        .stdout(predicate::str::contains("other.org\n"));
    assert!(cache.join("other.org/tool").is_dir());

    gopm(&workspace).arg("prune").assert().success();
    assert!(!cache.join("other.org").exists());
    assert!(cache.join("example.com/lib").is_dir());

    gopm(&workspace).args(["clean", "--all"]).assert().success();
    assert!(!cache.join("example.com").exists());
    assert!(cache.join(".gopm.lock").exists());
}
