//! The directive-driven harness (the runner half of the tool pair).
//!
//! A test is a plain text file whose leading comment block embeds `# RUN:`
//! shell pipelines and an optional `# XFAIL:` marker. Pipeline stages may
//! only invoke the binary under test or the filtered-diff check tool.
//!
//! ## Modules
//!
//! - `directive` - extraction, stage validation, and substitution
//! - `executor` - sequential shell execution and outcome classification
//! - `scheduler` - discovery, the worker pool, aggregation
//! - `report` - status lines, diagnostics, the summary block

pub mod directive;
pub mod executor;
pub mod report;
pub mod scheduler;

pub use directive::{DirectiveError, ParsedTestFile, SubstitutionContext, CHECK_TOOL, SUBJECT_TOOL};
pub use executor::{classify, Classification, ExecutionResult};
pub use report::{ConsoleReporter, Reporter, Verbosity};
pub use scheduler::{
    discover_tests, run, RunConfig, SchedulerError, Summary, DEFAULT_TEST_DIR, DEFAULT_WORKERS,
};
