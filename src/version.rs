//! Harness version information.
//!
//! This module exposes the harness version as a single constant so both binaries
//! (the runner and the check tool) agree on the same value.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.
//! - Prefer this constant over repeating `env!("CARGO_PKG_VERSION")` in multiple places.

/// The columbo-test version string (for example, `0.1.0`).
pub const COLUMBO_TEST_VERSION: &str = env!("CARGO_PKG_VERSION");
