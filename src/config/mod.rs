//! Project configuration (`gopm.toml`).
//!
//! Settings are read once and passed explicitly to the components that need them; nothing
//! reads configuration from global state.
//!
//! ```toml
//! [package]
//! name = "github.com/acme/app"   # import namespace of the project's own packages
//! sources = "src"                # source root holding import-path-shaped trees
//!
//! [toolchain]
//! goroot = "/usr/local/go"       # standard library is <goroot>/src
//! go = "go"                      # toolchain used by the external import scanner
//!
//! [dependencies]
//! cache = "vendor"
//! update_policy = "daily"
//! force_update = false
//! delete_unknown = true
//! delete_all_on_clean = false
//! scanner = "auto"
//! build = ["github.com/pkg/errors:v0.9.1"]
//! test = [{ group = "github.com/stretchr/testify", version = "v1.8.4" }]
//! tool = []
//!
//! [[providers]]
//! name = "Corporate git"
//! prefix = "git.acme.corp/"
//! pattern = '^(?P<root>git\.acme\.corp/[^/]+/[^/]+)(?P<subPath>(?:/[A-Za-z0-9_.\-]+)*)$'
//! ```
//!
//! Relative paths are resolved against the project directory after `~` and `$VAR`
//! expansion. `GOPM_CACHE_DIR` overrides the cache directory and `GOROOT` the toolchain root.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::GopmError;
use crate::ledger::UpdatePolicy;
use crate::models::{Configuration, Dependency, DependencySpec};
use crate::providers::ProviderDefinition;
use crate::resolver::{Locator, ResolverOptions};
use crate::scanner::ScannerMode;
use crate::utils::platform::{absolutize, resolve_path};

/// Name of the configuration file in the project directory.
pub const CONFIG_FILE_NAME: &str = "gopm.toml";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "GOPM_CACHE_DIR";

/// Environment variable naming the Go installation.
pub const GOROOT_ENV: &str = "GOROOT";

/// `[package]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSettings {
    /// Import namespace of the project's own packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Source root, default `src`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
}

/// `[toolchain]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainSettings {
    /// Go installation root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goroot: Option<String>,
    /// Go binary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go: Option<String>,
}

const fn default_true() -> bool {
    true
}

/// `[dependencies]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependenciesSettings {
    /// Dependency cache, default `vendor`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
    /// Refresh policy for dependencies that do not set their own
    #[serde(default)]
    pub update_policy: UpdatePolicy,
    /// Fetch everything on every run
    #[serde(default)]
    pub force_update: bool,
    /// Remove orphaned cache directories after `get`
    #[serde(default = "default_true")]
    pub delete_unknown: bool,
    /// Wipe the cache on `clean`
    #[serde(default)]
    pub delete_all_on_clean: bool,
    /// Import scanner selection
    #[serde(default)]
    pub scanner: ScannerMode,
    /// Dependencies needed to build
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build: Vec<DependencySpec>,
    /// Dependencies needed by tests
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<DependencySpec>,
    /// Tools run during the build
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool: Vec<DependencySpec>,
}

impl Default for DependenciesSettings {
    fn default() -> Self {
        Self {
            cache: None,
            update_policy: UpdatePolicy::default(),
            force_update: false,
            delete_unknown: true,
            delete_all_on_clean: false,
            scanner: ScannerMode::default(),
            build: Vec::new(),
            test: Vec::new(),
            tool: Vec::new(),
        }
    }
}

impl DependenciesSettings {
    /// Declared entries of one configuration.
    pub fn of(&self, configuration: Configuration) -> &[DependencySpec] {
        match configuration {
            Configuration::Build => &self.build,
            Configuration::Test => &self.test,
            Configuration::Tool => &self.tool,
        }
    }
}

/// Environment values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Overrides {
    cache: Option<String>,
    goroot: Option<String>,
}

/// Everything `gopm.toml` configures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// `[package]`
    #[serde(default)]
    pub package: PackageSettings,
    /// `[toolchain]`
    #[serde(default)]
    pub toolchain: ToolchainSettings,
    /// `[dependencies]`
    #[serde(default)]
    pub dependencies: DependenciesSettings,
    /// `[[providers]]`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<ProviderDefinition>,
    #[serde(skip)]
    project_dir: PathBuf,
    #[serde(skip)]
    overrides: Overrides,
}

impl Settings {
    /// Parses `content`; `origin` names the source in errors.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            GopmError::ConfigParseError {
                file: origin.display().to_string(),
                reason: e.to_string().trim().to_string(),
            }
            .into()
        })
    }

    /// Loads the settings of the project in `project_dir`.
    ///
    /// `config` overrides the default `<project_dir>/gopm.toml`; an explicit file must exist,
    /// while a missing default file yields the defaults. Environment overrides are applied.
    pub fn load(project_dir: &Path, config: Option<&Path>) -> Result<Self> {
        let project_dir = std::path::absolute(project_dir)
            .with_context(|| format!("Invalid project directory {}", project_dir.display()))?;
        let path = match config {
            Some(path) => absolutize(&project_dir, path),
            None => project_dir.join(CONFIG_FILE_NAME),
        };

        let mut settings = if path.is_file() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
            tracing::debug!("Loaded configuration from {}", path.display());
            Self::parse(&content, &path)?
        } else if config.is_some() {
            return Err(GopmError::ConfigParseError {
                file: path.display().to_string(),
                reason: "file does not exist".to_string(),
            }
            .into());
        } else {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, project_dir.display());
            Self::default()
        };
        settings.project_dir = project_dir;
        settings.apply_environment(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Same settings rooted at another project directory.
    #[must_use]
    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = project_dir.into();
        self
    }

    /// Takes `GOPM_CACHE_DIR` and `GOROOT` from `lookup`; empty values are ignored.
    pub fn apply_environment(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        self.overrides = Overrides {
            cache: lookup(CACHE_DIR_ENV),
            goroot: lookup(GOROOT_ENV),
        };
    }

    /// The project directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn resolve(&self, value: &str) -> Result<PathBuf> {
        Ok(absolutize(&self.project_dir, &resolve_path(value)?))
    }

    /// The dependency cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let value = self.overrides.cache.as_deref().or(self.dependencies.cache.as_deref()).unwrap_or("vendor");
        self.resolve(value)
    }

    /// The source root.
    pub fn source_root(&self) -> Result<PathBuf> {
        self.resolve(self.package.sources.as_deref().unwrap_or("src"))
    }

    /// `<goroot>/src` when a Go installation is configured.
    pub fn stdlib_root(&self) -> Result<Option<PathBuf>> {
        self.overrides
            .goroot
            .as_deref()
            .or(self.toolchain.goroot.as_deref())
            .map(|goroot| self.resolve(goroot).map(|root| root.join("src")))
            .transpose()
    }

    /// The configured Go binary, if any. Bare names are left for a `PATH` lookup.
    pub fn go_binary(&self) -> Result<Option<PathBuf>> {
        match self.toolchain.go.as_deref() {
            None => Ok(None),
            Some(go) if !go.contains('/') && !go.contains('\\') => Ok(Some(PathBuf::from(go))),
            Some(go) => self.resolve(go).map(Some),
        }
    }

    /// Declared dependencies of `configuration`, or of every configuration in order.
    pub fn declared(&self, configuration: Option<Configuration>) -> Result<Vec<Dependency>> {
        let configurations = match configuration {
            Some(configuration) => vec![configuration],
            None => Configuration::ALL.to_vec(),
        };
        let mut declared = Vec::new();
        for configuration in configurations {
            for spec in self.dependencies.of(configuration) {
                let dependency = spec
                    .to_dependency(self.dependencies.update_policy)
                    .with_context(|| format!("Invalid {configuration} dependency in {CONFIG_FILE_NAME}"))?;
                declared.push(dependency);
            }
        }
        Ok(declared)
    }

    /// The project's own package, when it has sources in the source root.
    pub fn own_package(&self) -> Result<Option<Dependency>> {
        let Some(name) = self.package.name.as_deref() else {
            return Ok(None);
        };
        let locator = self.locator()?;
        Ok(locator.source_dir(name).map(|_| Dependency::explicit(name).with_update_policy(self.dependencies.update_policy)))
    }

    /// The directory layout resolution runs against.
    pub fn locator(&self) -> Result<Locator> {
        Ok(Locator::new(&self.project_dir, self.cache_dir()?)
            .with_sources(self.source_root()?, self.package.name.clone())
            .with_stdlib_root(self.stdlib_root()?))
    }

    /// Resolver options, forcing updates when either the file or `force_update` asks for it.
    pub const fn resolver_options(&self, force_update: bool) -> ResolverOptions {
        ResolverOptions {
            force_update: force_update || self.dependencies.force_update,
            default_policy: self.dependencies.update_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::VcsType;
    use serial_test::serial;
    use tempfile::TempDir;

    const FULL: &str = r#"
[package]
name = "github.com/acme/app"
sources = "go/src"

[toolchain]
goroot = "/opt/go"

[dependencies]
cache = ".gopm/cache"
update_policy = "daily"
delete_unknown = false
scanner = "regex"
build = ["github.com/pkg/errors:v0.9.1", "gopkg.in/yaml.v2"]
test = [{ group = "bitbucket.org/team/lib", type = "hg", update_policy = "always" }]

[[providers]]
name = "Corporate git"
prefix = "git.acme.corp/"
pattern = '^(?P<root>git\.acme\.corp/[^/]+/[^/]+)(?P<subPath>(?:/[A-Za-z0-9_.\-]+)*)$'
"#;

    fn settings(content: &str, project: &Path) -> Settings {
        Settings::parse(content, Path::new(CONFIG_FILE_NAME)).unwrap().with_project_dir(project)
    }

    #[test]
    fn test_defaults() {
        let settings = settings("", Path::new("/work/app"));
        assert_eq!(settings.cache_dir().unwrap(), PathBuf::from("/work/app/vendor"));
        assert_eq!(settings.source_root().unwrap(), PathBuf::from("/work/app/src"));
        assert!(settings.dependencies.delete_unknown);
        assert!(!settings.dependencies.delete_all_on_clean);
        assert_eq!(settings.dependencies.update_policy, UpdatePolicy::Never);
        assert_eq!(settings.dependencies.scanner, ScannerMode::Auto);
        assert!(settings.declared(None).unwrap().is_empty());
    }

    #[test]
    fn test_full_file() {
        let settings = settings(FULL, Path::new("/work/app"));
        assert_eq!(settings.cache_dir().unwrap(), PathBuf::from("/work/app/.gopm/cache"));
        assert_eq!(settings.source_root().unwrap(), PathBuf::from("/work/app/go/src"));
        assert_eq!(settings.stdlib_root().unwrap(), Some(PathBuf::from("/opt/go/src")));
        assert!(!settings.dependencies.delete_unknown);
        assert_eq!(settings.dependencies.scanner, ScannerMode::Regex);
        assert_eq!(settings.providers[0].name, "Corporate git");

        let all = settings.declared(None).unwrap();
        let rendered: Vec<String> = all.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["github.com/pkg/errors:v0.9.1", "gopkg.in/yaml.v2", "bitbucket.org/team/lib"]);
        assert_eq!(all[0].update_policy, UpdatePolicy::Daily);
        assert_eq!(all[2].update_policy, UpdatePolicy::Always);
        assert_eq!(all[2].vcs_type, Some(VcsType::Hg));

        assert_eq!(settings.declared(Some(Configuration::Test)).unwrap().len(), 1);
        assert!(settings.declared(Some(Configuration::Tool)).unwrap().is_empty());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut settings = settings(FULL, Path::new("/work/app"));
        settings.apply_environment(|key| match key {
            CACHE_DIR_ENV => Some("/var/cache/gopm".to_string()),
            GOROOT_ENV => Some("/usr/lib/go".to_string()),
            _ => None,
        });
        assert_eq!(settings.cache_dir().unwrap(), PathBuf::from("/var/cache/gopm"));
        assert_eq!(settings.stdlib_root().unwrap(), Some(PathBuf::from("/usr/lib/go/src")));

        settings.apply_environment(|_| Some("  ".to_string()));
        assert_eq!(settings.cache_dir().unwrap(), PathBuf::from("/work/app/.gopm/cache"));
    }

    #[test]
    fn test_invalid_files() {
        for content in [
            "[dependencies]\nbuild = [\"github.com/a/b:\"]\n",
            "[dependencies]\nupdate_policy = \"sometimes\"\n",
            "[package]\nunknown = 1\n",
            "[dependencies\n",
        ] {
            let parsed = Settings::parse(content, Path::new(CONFIG_FILE_NAME));
            let invalid = match parsed {
                Err(error) => matches!(error.downcast_ref::<GopmError>(), Some(GopmError::ConfigParseError { .. })),
                Ok(settings) => settings.declared(None).is_err(),
            };
            assert!(invalid, "{content}");
        }
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(Settings::load(temp.path(), Some(Path::new("missing.toml"))).is_err());
    }

    #[test]
    fn test_own_package_requires_sources() {
        let temp = TempDir::new().unwrap();
        let settings = settings("[package]\nname = \"github.com/acme/app\"\n", temp.path());
        assert!(settings.own_package().unwrap().is_none());

        std::fs::create_dir_all(temp.path().join("src/github.com/acme/app")).unwrap();
        assert_eq!(settings.own_package().unwrap().unwrap().group, "github.com/acme/app");
    }

    #[test]
    #[serial]
    fn test_load_reads_process_environment() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "[dependencies]\ncache = \"deps\"\n").unwrap();

        let loaded = Settings::load(temp.path(), None).unwrap();
        let expected = std::env::var(CACHE_DIR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| temp.path().join("deps"), PathBuf::from);
        assert_eq!(loaded.cache_dir().unwrap(), expected);

        unsafe {
            std::env::set_var(CACHE_DIR_ENV, temp.path().join("elsewhere"));
        }
        let overridden = Settings::load(temp.path(), None);
        unsafe {
            std::env::remove_var(CACHE_DIR_ENV);
        }
        assert_eq!(overridden.unwrap().cache_dir().unwrap(), temp.path().join("elsewhere"));
    }
}
