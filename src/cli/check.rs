//! Argument surface and entry point for the `columbo_check` binary.
//!
//! The check tool compares a solver transcript against a check file,
//! ignoring comment lines and surrounding whitespace on both sides. A
//! mismatch prints a unified diff to stderr and exits nonzero, so a
//! `columbo ... | columbo_check expected.txt` pipeline under
//! `bash -o pipefail` fails the whole step.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::cli::{CliError, CliResult, ExitCode};
use crate::diff::{compare, filter_lines, Comparison};
use crate::lines::LineSource;
use crate::version::COLUMBO_TEST_VERSION;

/// Exit code for unreadable inputs, distinct from a comparison mismatch.
const BAD_INPUT: i32 = 2;

/// Compare solver output against a check file
#[derive(Parser, Debug)]
#[command(name = "columbo_check")]
#[command(version = COLUMBO_TEST_VERSION)]
#[command(about = "Compare solver output against a check file", long_about = None)]
pub struct CheckCli {
    /// Check file holding the expected output
    #[arg(value_name = "CHECK_FILE")]
    pub check_file: PathBuf,

    /// Read candidate output from this file instead of stdin
    #[arg(long = "input-file", value_name = "PATH")]
    pub input_file: Option<PathBuf>,
}

/// Check tool entry point.
///
/// The only place where `process::exit` is called for the check tool.
pub fn run_check() {
    let cli = CheckCli::parse();

    match execute_check(cli) {
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

/// Execute the comparison and return its exit code.
pub fn execute_check(cli: CheckCli) -> CliResult<ExitCode> {
    let check_source = LineSource::file(cli.check_file);
    let input_source = cli
        .input_file
        .map(LineSource::File)
        .unwrap_or(LineSource::Stdin);

    let check_lines = filter_with_context(&check_source)?;
    let input_lines = filter_with_context(&input_source)?;

    match compare(&check_lines, &input_lines) {
        Comparison::Match => Ok(ExitCode::SUCCESS),
        Comparison::Mismatch { diff } => {
            eprint!("{diff}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Read and filter one side, labelling I/O failures with their origin.
fn filter_with_context(source: &LineSource) -> CliResult<Vec<String>> {
    let lines = source
        .open()
        .and_then(|lines| filter_lines(lines))
        .map_err(|e: io::Error| CliError::with_code(format!("cannot read {source}: {e}"), BAD_INPUT))?;
    Ok(lines)
}

// ============================================================================
// Tests
// ============================================================================
