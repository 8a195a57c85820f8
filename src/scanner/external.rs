//! Import extraction delegated to the Go toolchain.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::OnceCell;

use super::{ImportScanner, is_relative};
use crate::core::GopmError;

/// Source of the helper program, built once per scanner with `go build`.
pub const EXTRACTOR_SOURCE: &str = include_str!("../../resources/imports_extractor.go");

const EXTRACTOR_FILE_NAME: &str = "imports_extractor.go";

#[cfg(windows)]
const EXTRACTOR_BINARY_NAME: &str = "imports_extractor.exe";
#[cfg(not(windows))]
const EXTRACTOR_BINARY_NAME: &str = "imports_extractor";

/// Runs the embedded extractor for every file.
///
/// The helper is written to a private temporary directory that lives as long as the scanner,
/// and compiled there on the first scan. Later scans run the compiled binary.
#[derive(Debug)]
pub struct ExternalImportScanner {
    go: PathBuf,
    workspace: TempDir,
    extractor: OnceCell<PathBuf>,
}

impl ExternalImportScanner {
    /// Prepares the helper for the toolchain binary `go`.
    pub fn new(go: impl Into<PathBuf>) -> Result<Self> {
        let workspace = tempfile::Builder::new()
            .prefix("gopm-extractor-")
            .tempdir()
            .context("Failed to create directory for the imports extractor")?;
        std::fs::write(workspace.path().join(EXTRACTOR_FILE_NAME), EXTRACTOR_SOURCE)
            .context("Failed to write the imports extractor")?;
        Ok(Self {
            go: go.into(),
            workspace,
            extractor: OnceCell::new(),
        })
    }

    /// The toolchain binary in use.
    pub fn go(&self) -> &Path {
        &self.go
    }

    async fn extractor(&self) -> Result<&Path> {
        let binary = self.extractor.get_or_try_init(|| self.build_extractor()).await?;
        Ok(binary.as_path())
    }

    async fn build_extractor(&self) -> Result<PathBuf> {
        let source = self.workspace.path().join(EXTRACTOR_FILE_NAME);
        let binary = self.workspace.path().join(EXTRACTOR_BINARY_NAME);
        let failed = |reason: String| GopmError::ScannerFailed {
            file: source.display().to_string(),
            reason,
        };

        tracing::debug!("Building the imports extractor with {}", self.go.display());
        let output = Command::new(&self.go)
            .arg("build")
            .arg("-o")
            .arg(&binary)
            .arg(&source)
            .current_dir(self.workspace.path())
            .env("GO111MODULE", "off")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| failed(format!("could not run {}: {e}", self.go.display())))?;

        if !output.status.success() {
            return Err(failed(String::from_utf8_lossy(&output.stderr).trim().to_string()).into());
        }
        Ok(binary)
    }
}

/// Keeps the quoted lines of the extractor's output, unquoted.
pub fn parse_extractor_output(stdout: &str) -> BTreeSet<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.len() >= 2 && line.starts_with('"') && line.ends_with('"'))
        .map(|line| line[1..line.len() - 1].to_string())
        .filter(|import| !import.is_empty() && !is_relative(import))
        .collect()
}

#[async_trait]
impl ImportScanner for ExternalImportScanner {
    async fn scan_file(&self, file: &Path) -> Result<BTreeSet<String>> {
        let extractor = self.extractor().await?;
        let failed = |reason: String| GopmError::ScannerFailed {
            file: file.display().to_string(),
            reason,
        };

        let output = Command::new(extractor)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| failed(format!("could not run {}: {e}", extractor.display())))?;

        if !output.status.success() {
            return Err(failed(String::from_utf8_lossy(&output.stderr).trim().to_string()).into());
        }
        Ok(parse_extractor_output(&String::from_utf8_lossy(&output.stdout)))
    }
}
