//! Cross-platform utilities shared across gopm.
//!
//! - [`fs`] - directory management, atomic writes, JSON file helpers
//! - [`platform`] - executable lookup and path expansion
//! - [`progress`] - the spinner shown while dependencies resolve

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{atomic_write, empty_dir, ensure_dir, remove_dir_all};
pub use platform::{get_git_command, is_windows, resolve_path};
pub use progress::ProgressBar;
