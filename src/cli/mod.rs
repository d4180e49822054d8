//! CLI module for the columbo test harness
//!
//! This module provides the command-line interfaces for both binaries.
//!
//! ## Binaries
//!
//! - `columbo-test` - run directive-driven tests against a columbo binary
//! - `columbo_check` - filtered diff between solver output and a check file
//!
//! ## Modules
//!
//! - `check` - the check tool's argument surface and entry point
//!
//! ## Design
//!
//! Both CLIs use clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` / `run_check()` functions handle errors and exit.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod check;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};

use crate::harness::{self, ConsoleReporter, RunConfig, Verbosity, CHECK_TOOL, DEFAULT_WORKERS};
use crate::version::COLUMBO_TEST_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry points
/// catch these errors, print the message, and exit with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an error with a custom exit code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Directive-driven test harness for the columbo solver
#[derive(Parser, Debug)]
#[command(name = "columbo-test")]
#[command(version = COLUMBO_TEST_VERSION)]
#[command(about = "Run directive-driven tests against a columbo binary", long_about = None)]
pub struct Cli {
    /// Path to the columbo binary under test
    #[arg(long = "columbo-binary", value_name = "PATH")]
    pub columbo_binary: PathBuf,

    /// Worker pool size
    #[arg(short = 'j', long = "workers", value_name = "N", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Show diagnostics for expected failures and unresolved tests
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Also echo the step transcript for passing tests
    #[arg(long = "very-verbose")]
    pub very_verbose: bool,

    /// Test files and/or directories of *.txt tests
    #[arg(value_name = "TEST_PATH", value_parser = readable_path)]
    pub test_paths: Vec<PathBuf>,
}

/// Argument-level validation: a test path must name an existing file or
/// directory, so typos fail as usage errors before anything runs.
fn readable_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() || path.is_dir() {
        Ok(path)
    } else {
        Err(format!("'{value}' is not a valid path"))
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main harness entry point.
///
/// This is the only place where `process::exit` is called for the harness.
/// All command implementations return `CliResult` and errors are handled
/// here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the harness and return its exit code.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = build_config(&cli)?;
    let test_paths = if cli.test_paths.is_empty() {
        vec![PathBuf::from(harness::DEFAULT_TEST_DIR)]
    } else {
        cli.test_paths
    };

    let mut reporter = ConsoleReporter::from_config(&config);
    let summary = harness::run(&test_paths, &config, &mut reporter)
        .map_err(|e| CliError::failure(e.to_string()))?;
    Ok(ExitCode(summary.exit_code()))
}

fn build_config(cli: &Cli) -> CliResult<RunConfig> {
    Ok(RunConfig {
        subject_binary: cli.columbo_binary.clone(),
        check_tool: locate_check_tool()?,
        workers: cli.workers,
        verbosity: verbosity_from_flags(cli.verbose, cli.very_verbose),
        columns: terminal_columns(),
        use_colors: atty::is(atty::Stream::Stdout),
    })
}

fn verbosity_from_flags(verbose: u8, very_verbose: bool) -> Verbosity {
    if very_verbose || verbose >= 2 {
        Verbosity::VeryVerbose
    } else if verbose == 1 {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// The check tool ships next to the harness binary.
fn locate_check_tool() -> CliResult<PathBuf> {
    let exe = env::current_exe()
        .map_err(|e| CliError::failure(format!("cannot locate the harness executable: {e}")))?;
    Ok(exe.with_file_name(CHECK_TOOL))
}

/// Terminal width for status alignment: `COLUMNS` when set, else 80.
fn terminal_columns() -> usize {
    env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(80)
}

// ============================================================================
// Tests
// ============================================================================
