//! Integration test suite for addon-updater
//!
//! End-to-end tests against a local `wiremock` server standing in for the
//! download page and archive host.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: The binary's exit codes, `--check` output, and log file
//! - **install_flow**: Library-level workflows (config file, overlapping runs)

mod cli;
mod install_flow;
