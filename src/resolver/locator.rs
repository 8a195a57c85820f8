//! Finding where the sources of a dependency live on disk.

use std::path::{Path, PathBuf};

use crate::models::{Dependency, DependencyKind};
use crate::scanner::has_source_files;

/// `<base>/<group segments>`.
pub fn group_dir(base: &Path, group: &str) -> PathBuf {
    group.split('/').filter(|segment| !segment.is_empty()).fold(base.to_path_buf(), |path, segment| path.join(segment))
}

/// Directory layout a resolution runs against.
///
/// Lookups are tried in a fixed order: vendor directories walked upward from the importing
/// dependency, the dependency cache, the project's source root, then the standard library.
#[derive(Debug, Clone)]
pub struct Locator {
    project_dir: PathBuf,
    cache_root: PathBuf,
    source_root: Option<PathBuf>,
    stdlib_root: Option<PathBuf>,
    package: Option<String>,
}

impl Locator {
    /// A layout with only a project directory and a cache.
    pub fn new(project_dir: impl Into<PathBuf>, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            cache_root: cache_root.into(),
            source_root: None,
            stdlib_root: None,
            package: None,
        }
    }

    /// Sets the source root and the import namespace of the project's own packages.
    #[must_use]
    pub fn with_sources(mut self, source_root: impl Into<PathBuf>, package: Option<String>) -> Self {
        self.source_root = Some(source_root.into());
        self.package = package.map(|p| p.trim_end_matches('/').to_string()).filter(|p| !p.is_empty());
        self
    }

    /// Sets the standard library root, usually `$GOROOT/src`.
    #[must_use]
    pub fn with_stdlib_root(mut self, stdlib_root: Option<PathBuf>) -> Self {
        self.stdlib_root = stdlib_root;
        self
    }

    /// The dependency cache.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// The project directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// The project's package name.
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Whether `group` is the project's package or one of its sub-packages.
    pub fn in_namespace(&self, group: &str) -> bool {
        self.package.as_deref().is_some_and(|package| {
            group == package || group.strip_prefix(package).is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Directory of `group` below the source root, if it exists.
    pub fn source_dir(&self, group: &str) -> Option<PathBuf> {
        self.source_root.as_deref().map(|root| group_dir(root, group)).filter(|dir| dir.is_dir())
    }

    fn boundaries(&self) -> impl Iterator<Item = &Path> {
        [Some(self.project_dir.as_path()), Some(self.cache_root.as_path()), self.source_root.as_deref()]
            .into_iter()
            .flatten()
    }

    /// First `<dir>/vendor/<group>` holding source files, walking upward from `start`.
    ///
    /// The walk stops after the project directory, the cache root or the source root,
    /// whichever comes first. A start outside all of them is the only directory checked.
    pub fn find_vendored(&self, group: &str, start: &Path) -> Option<PathBuf> {
        for dir in start.ancestors() {
            let candidate = group_dir(&dir.join("vendor"), group);
            if has_source_files(&candidate) {
                return Some(candidate);
            }
            if self.boundaries().any(|boundary| boundary == dir)
                || !self.boundaries().any(|boundary| dir.starts_with(boundary))
            {
                break;
            }
        }
        None
    }

    /// Kind and location of `dependency`.
    ///
    /// Dependencies without an importing parent start their vendor search in the project
    /// directory. A location in the source root makes the dependency `source` when it is in
    /// the project's namespace; one in the standard library makes it `system`. Otherwise the
    /// dependency keeps its own kind, with no location when nothing matched. In particular a
    /// declared dependency found in the source root outside the namespace stays `explicit`
    /// rather than becoming `implicit`.
    pub fn locate(&self, dependency: &Dependency) -> (DependencyKind, Option<PathBuf>) {
        let group = dependency.group.as_str();
        let start = dependency
            .parent
            .as_ref()
            .and_then(|parent| parent.location.clone())
            .unwrap_or_else(|| self.project_dir.clone());

        if let Some(vendored) = self.find_vendored(group, &start) {
            return (dependency.kind, Some(vendored));
        }

        let cached = group_dir(&self.cache_root, group);
        if cached.is_dir() {
            return (dependency.kind, Some(cached));
        }

        if let Some(source) = self.source_dir(group) {
            let kind = if self.in_namespace(group) {
                DependencyKind::Source
            } else {
                dependency.kind
            };
            return (kind, Some(source));
        }

        if let Some(system) = self.stdlib_root.as_deref().map(|root| group_dir(root, group)).filter(|dir| dir.is_dir()) {
            return (DependencyKind::System, Some(system));
        }

        (dependency.kind, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Parent;
    use tempfile::TempDir;

    fn write(root: &Path, file: &str) {
        let path = root.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "package x\n").unwrap();
    }

    struct Layout {
        _temp: TempDir,
        project: PathBuf,
        locator: Locator,
    }

    fn layout() -> Layout {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        let goroot = temp.path().join("goroot");
        std::fs::create_dir_all(&project).unwrap();
        let locator = Locator::new(&project, project.join(".gopm/cache"))
            .with_sources(project.join("src"), Some("github.com/acme/app".into()))
            .with_stdlib_root(Some(goroot.join("src")));
        Layout {
            _temp: temp,
            project,
            locator,
        }
    }

    #[test]
    fn test_namespace() {
        let layout = layout();
        assert!(layout.locator.in_namespace("github.com/acme/app"));
        assert!(layout.locator.in_namespace("github.com/acme/app/util"));
        assert!(!layout.locator.in_namespace("github.com/acme/application"));
        assert!(!Locator::new("/p", "/c").in_namespace("github.com/acme/app"));
    }

    #[test]
    fn test_vendor_walk_up_from_parent() {
        let layout = layout();
        let cache = layout.locator.cache_root().to_path_buf();
        write(&cache, "github.com/a/b/vendor/github.com/x/y/y.go");
        std::fs::create_dir_all(cache.join("github.com/a/b/sub")).unwrap();
        write(&cache, "github.com/x/y/y.go");

        let dependency = Dependency::implicit(
            "github.com/x/y",
            Some(Parent {
                group: "github.com/a/b/sub".into(),
                location: Some(cache.join("github.com/a/b/sub")),
            }),
        );
        let (kind, location) = layout.locator.locate(&dependency);
        assert_eq!(kind, DependencyKind::Implicit);
        assert_eq!(location, Some(cache.join("github.com/a/b/vendor/github.com/x/y")));
    }

    #[test]
    fn test_vendor_without_sources_is_skipped() {
        let layout = layout();
        let cache = layout.locator.cache_root().to_path_buf();
        std::fs::create_dir_all(cache.join("github.com/a/b/vendor/github.com/x/y")).unwrap();
        write(&cache, "github.com/x/y/y.go");

        let dependency = Dependency::implicit(
            "github.com/x/y",
            Some(Parent {
                group: "github.com/a/b".into(),
                location: Some(cache.join("github.com/a/b")),
            }),
        );
        assert_eq!(layout.locator.locate(&dependency).1, Some(cache.join("github.com/x/y")));
    }

    #[test]
    fn test_top_level_uses_project_vendor() {
        let layout = layout();
        write(&layout.project, "vendor/github.com/x/y/y.go");
        let (kind, location) = layout.locator.locate(&Dependency::explicit("github.com/x/y"));
        assert_eq!(kind, DependencyKind::Explicit);
        assert_eq!(location, Some(layout.project.join("vendor/github.com/x/y")));
    }

    #[test]
    fn test_source_and_system() {
        let layout = layout();
        write(&layout.project, "src/github.com/acme/app/main.go");
        write(&layout.project, "src/github.com/other/lib/lib.go");
        let goroot_src = layout.project.parent().unwrap().join("goroot/src");
        write(&goroot_src, "golang.org/x/net/net.go");

        let (kind, _) = layout.locator.locate(&Dependency::implicit("github.com/acme/app", None));
        assert_eq!(kind, DependencyKind::Source);
        let (kind, _) = layout.locator.locate(&Dependency::implicit("github.com/other/lib", None));
        assert_eq!(kind, DependencyKind::Implicit);
        let (kind, location) = layout.locator.locate(&Dependency::explicit("github.com/other/lib"));
        assert_eq!(kind, DependencyKind::Explicit);
        assert_eq!(location, Some(layout.project.join("src/github.com/other/lib")));
        let (kind, location) = layout.locator.locate(&Dependency::implicit("golang.org/x/net", None));
        assert_eq!(kind, DependencyKind::System);
        assert_eq!(location, Some(goroot_src.join("golang.org/x/net")));
    }

    #[test]
    fn test_unlocated() {
        let layout = layout();
        let (kind, location) = layout.locator.locate(&Dependency::implicit("github.com/no/where", None));
        assert_eq!(kind, DependencyKind::Implicit);
        assert_eq!(location, None);
    }
}
