//! Platform helpers: executable names, executable lookup, path expansion.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Whether we are running on Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// The git executable name for this platform.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// The Go toolchain executable name for this platform.
#[must_use]
pub const fn get_go_command() -> &'static str {
    if is_windows() {
        "go.exe"
    } else {
        "go"
    }
}

/// Expands `~` and environment variables in `path`.
///
/// Unknown variables are an error rather than being left in place.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path: {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Resolves `path` against `base` unless it is already absolute.
#[must_use]
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Locates an executable on `PATH`.
#[must_use]
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Relative path of `path` below `root` with `/` separators.
///
/// Returns `None` when `path` is not inside `root`.
#[must_use]
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> =
        relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    Some(segments.join("/"))
}
