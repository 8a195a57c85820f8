use gopm::cli::common::{build_resolver, seed_dependencies};
use gopm::models::{DependencyKind, Outcome};
use gopm::resolver::Resolution;

use crate::common::{Workspace, entry};

const LIB: &[(&str, &str)] = &[
    (
        "lib.go",
        "package lib\n\nimport (\n\t\"fmt\"\n\n\t\"example.com/lib/sub\"\n\t\"example.com/util\"\n)\n",
    ),
    ("sub/sub.go", "package sub\n\nimport \"strings\"\n"),
];

const UTIL: &[(&str, &str)] = &[("util.go", "package util\n")];

fn summary(resolution: &Resolution) -> Vec<(String, DependencyKind, Outcome)> {
    resolution.dependencies.iter().map(|(d, o)| (d.group.clone(), d.kind, *o)).collect()
}

fn setup() -> Workspace {
    let workspace = Workspace::new();
    let lib = workspace.remote("lib", LIB);
    let util = workspace.remote("util", UTIL);
    workspace.configure(&[entry("example.com/lib", &lib.uri()), entry("example.com/util", &util.uri())]);
    workspace.write("src/example.com/app/main.go", "package main\n\nimport \"example.com/lib\"\n");
    workspace
}

#[tokio::test]
async fn test_resolves_project_closure() {
    let workspace = setup();
    let settings = workspace.settings();
    let resolver = build_resolver(&settings, false).unwrap();
    let seeds = seed_dependencies(&settings, settings.declared(None).unwrap()).unwrap();
    assert_eq!(seeds[0].group, "example.com/app");

    let resolution = resolver.resolve(&seeds).await.unwrap();
    assert_eq!(
        summary(&resolution),
        [
            ("example.com/app".to_string(), DependencyKind::Source, Outcome::AlreadySatisfied),
            ("example.com/lib".to_string(), DependencyKind::Explicit, Outcome::Downloaded),
            ("example.com/lib/sub".to_string(), DependencyKind::Implicit, Outcome::AlreadySatisfied),
            ("example.com/util".to_string(), DependencyKind::Explicit, Outcome::Downloaded),
        ]
    );
    assert_eq!(resolution.ids.iter().map(String::as_str).collect::<Vec<_>>(), ["example.com/lib", "example.com/util"]);

    let cache = workspace.cache();
    assert!(cache.join("example.com/lib/sub/sub.go").is_file());
    assert!(cache.join("example.com/lib/.vcs-repository-info").is_file());
    assert!(!cache.join("example.com/lib/.git").exists());
    assert!(cache.join("example.com/util/util.go").is_file());
}

#[tokio::test]
async fn test_second_run_fetches_nothing() {
    let workspace = setup();
    let settings = workspace.settings();
    let resolver = build_resolver(&settings, false).unwrap();
    let seeds = seed_dependencies(&settings, settings.declared(None).unwrap()).unwrap();

    resolver.resolve(&seeds).await.unwrap();
    let second = resolver.resolve(&seeds).await.unwrap();
    assert_eq!(second.downloaded().count(), 0);
    assert_eq!(second.dependencies.len(), 4);

    let forced = build_resolver(&settings, true).unwrap().resolve(&seeds).await.unwrap();
    let downloaded: Vec<&str> = forced.downloaded().map(|d| d.group.as_str()).collect();
    assert_eq!(downloaded, ["example.com/lib", "example.com/util"]);
}

#[tokio::test]
async fn test_unreachable_dependency_fails_the_run() {
    let workspace = Workspace::new();
    let lib = workspace.remote("lib", LIB);
    let missing = format!("file://{}", workspace.remotes.join("util").display());
    workspace.configure(&[entry("example.com/lib", &lib.uri()), entry("example.com/util", &missing)]);

    let settings = workspace.settings();
    let resolver = build_resolver(&settings, false).unwrap();
    let error = resolver.resolve(&settings.declared(None).unwrap()).await.unwrap_err();
    assert!(format!("{error:#}").contains("example.com/util"));
}
