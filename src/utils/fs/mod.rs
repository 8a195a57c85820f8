//! File system helpers.
//!
//! Writes go through [`atomic_write`] so an interrupted run never leaves a half-written
//! ledger entry behind.

pub mod atomic;
pub mod dirs;
pub mod formats;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{empty_dir, ensure_dir, remove_dir_all};
pub use formats::{read_json_file, write_json_file};
