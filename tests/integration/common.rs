//! Fixtures: a temporary project plus git remotes living next to it.

use gopm::config::Settings;
use gopm::test_utils::TestGit;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Pattern of the `example.com/<repo>` test host.
pub const EXAMPLE_PATTERN: &str = r"^(?P<root>example\.com/[a-z]+)(?P<subPath>(?:/[a-z]+)*)$";

/// A project directory and a directory of remotes.
pub struct Workspace {
    _temp: TempDir,
    pub project: PathBuf,
    pub remotes: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        gopm::test_utils::init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        let remotes = temp.path().join("remotes");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::create_dir_all(&remotes).unwrap();
        Self {
            _temp: temp,
            project,
            remotes,
        }
    }

    /// A committed repository at `remotes/<name>` holding `files`.
    pub fn remote(&self, name: &str, files: &[(&str, &str)]) -> TestGit {
        let git = TestGit::create(self.remotes.join(name)).unwrap();
        for (path, content) in files {
            git.write_file(path, content).unwrap();
        }
        git.commit_all("Initial commit").unwrap();
        git
    }

    pub fn write(&self, file: &str, content: &str) {
        let path = self.project.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn cache(&self) -> PathBuf {
        self.project.join(".gopm/cache")
    }

    /// Writes `gopm.toml` for the `example.com/app` project with the given build entries.
    pub fn configure(&self, build: &[String]) {
        let config = format!(
            r#"[package]
name = "example.com/app"

[dependencies]
cache = ".gopm/cache"
scanner = "regex"
build = [{}]

[[providers]]
name = "Example"
prefix = "example.com/"
pattern = '{EXAMPLE_PATTERN}'
"#,
            build.join(", ")
        );
        self.write("gopm.toml", &config);
    }

    pub fn settings(&self) -> Settings {
        Settings::load(&self.project, None).unwrap()
    }
}

/// A `build` entry pinning `group` to the repository at `uri`.
pub fn entry(group: &str, uri: &str) -> String {
    format!(r#"{{ group = "{group}", uri = "{uri}" }}"#)
}

pub fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/")
}
