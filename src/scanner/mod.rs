//! Import scanning: discovering the packages a source tree depends on.
//!
//! Two [`ImportScanner`] implementations exist. [`ExternalImportScanner`] runs a small Go
//! program through the toolchain and is authoritative; [`RegexImportScanner`] works offline
//! and covers the common ways imports are written. [`create_scanner`] picks one according to
//! [`ScannerMode`].

mod external;
mod textual;

pub use external::{EXTRACTOR_SOURCE, ExternalImportScanner, parse_extractor_output};
pub use textual::RegexImportScanner;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::GopmError;
use crate::utils::platform::{find_executable, get_go_command};

/// Extracts the import paths of one source file.
#[async_trait]
pub trait ImportScanner: Send + Sync {
    /// Distinct, non-relative import paths of `file`.
    async fn scan_file(&self, file: &Path) -> Result<BTreeSet<String>>;
}

/// Which scanner to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScannerMode {
    /// The toolchain extractor when `go` can be found, else regular expressions
    #[default]
    Auto,
    /// Regular expressions only
    Regex,
    /// The toolchain extractor; failing when `go` is missing
    External,
}

/// Builds the scanner for `mode`. `go` overrides the toolchain binary looked up on `PATH`.
pub fn create_scanner(mode: ScannerMode, go: Option<&Path>) -> Result<Box<dyn ImportScanner>> {
    let toolchain: Option<PathBuf> = match go {
        Some(path) if path.is_file() => Some(path.to_path_buf()),
        Some(path) => find_executable(&path.to_string_lossy()),
        None => find_executable(get_go_command()),
    };

    match (mode, toolchain) {
        (ScannerMode::Regex, _) | (ScannerMode::Auto, None) => {
            tracing::debug!("Scanning imports with regular expressions");
            Ok(Box::new(RegexImportScanner::new()?))
        }
        (ScannerMode::Auto | ScannerMode::External, Some(go)) => {
            tracing::debug!("Scanning imports with {}", go.display());
            Ok(Box::new(ExternalImportScanner::new(go)?))
        }
        (ScannerMode::External, None) => Err(GopmError::ScannerFailed {
            file: go.map(|p| p.display().to_string()).unwrap_or_else(|| get_go_command().to_string()),
            reason: "the Go toolchain could not be found".to_string(),
        }
        .into()),
    }
}

/// `./x`, `../x`, `.`, `..` and absolute paths.
pub fn is_relative(import: &str) -> bool {
    import == "."
        || import == ".."
        || import.starts_with("./")
        || import.starts_with("../")
        || import.starts_with('/')
}

/// Whether an import path names a hosted package rather than the standard library: its
/// first segment contains a dot.
pub fn looks_external(import: &str) -> bool {
    if is_relative(import) {
        return false;
    }
    import.split('/').next().is_some_and(|host| host.contains('.'))
}

/// Directories the scan never descends into.
fn is_ignored_dir(name: &str) -> bool {
    name == "vendor" || name == "testdata" || name.starts_with('.') || name.starts_with('_')
}

/// All `.go` files below `dir`, skipping `vendor`, `testdata` and hidden or `_` directories.
pub fn source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !is_ignored_dir(&entry.file_name().to_string_lossy())
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "go"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// Whether `dir` directly contains a `.go` file.
pub fn has_source_files(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries.filter_map(Result::ok).any(|entry| {
            entry.path().extension().is_some_and(|ext| ext == "go")
                && entry.file_type().is_ok_and(|t| t.is_file())
        })
    })
}

/// Union of the imports of every source file below `dir`.
pub async fn scan_dir(scanner: &dyn ImportScanner, dir: &Path) -> Result<BTreeSet<String>> {
    let mut imports = BTreeSet::new();
    for file in source_files(dir) {
        let found = scanner
            .scan_file(&file)
            .await
            .with_context(|| format!("Failed to scan imports of {}", file.display()))?;
        imports.extend(found);
    }
    Ok(imports)
}
