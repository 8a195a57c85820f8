//! Integration test suite for gopm
//!
//! These tests drive real git repositories created on disk and fetched over `file://`, the
//! resolver end to end and the `gopm` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **common**: project and remote fixtures shared by the other modules
//! - **git_transport**: `GitCli` against local repositories, ledger round trip
//! - **resolver**: closure computation with a custom provider and explicit URIs
//! - **reconciliation**: orphan detection after a real resolution
//! - **cli**: the `gopm` binary via `assert_cmd`
//!
//! Tests require `git` on `PATH`.

mod cli;
mod common;
mod git_transport;
mod reconciliation;
mod resolver;
