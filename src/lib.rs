#![forbid(unsafe_code)]
//! Columbo Test Harness
//!
//! A directive-driven test runner for the columbo sudoku solver. Test files
//! carry `# RUN:` lines naming the shell pipelines to execute; this crate
//! discovers the tests, expands the directives, runs them through a worker
//! pool, and reports per-test status plus a summary. The companion
//! `columbo_check` binary is the filtered diff those pipelines pipe into.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a harness bug (logic error), use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod cli;
pub mod diff;
pub mod harness;
pub mod lines;
pub mod version;

pub use harness::directive;
pub use harness::executor;
pub use harness::report;
pub use harness::scheduler;

pub use diff::{Comparison, compare, filter_lines, filter_source};
pub use lines::LineSource;

pub use harness::{
    Classification, ConsoleReporter, DirectiveError, ExecutionResult, ParsedTestFile, Reporter,
    RunConfig, SchedulerError, SubstitutionContext, Summary, Verbosity, classify, discover_tests,
    run,
};
