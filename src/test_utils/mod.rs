//! Test utilities for gopm
//!
//! Available to unit tests and, through the `test-utils` feature, to integration tests.
//!
//! - [`init_test_logging`] installs a tracing subscriber once per process
//! - [`TestGit`] builds real git repositories for `file://` fetches
//! - [`FakeTransport`] and [`FakeMetadataClient`] replace the network

pub mod fakes;
pub mod git_helper;

pub use fakes::{FakeMetadataClient, FakeTransport};
pub use git_helper::TestGit;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG` when set; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=resolver=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
