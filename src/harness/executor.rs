//! Sequential command execution and outcome classification.
//!
//! Each expanded command line runs as one `bash -o pipefail -c` invocation,
//! so a failure anywhere in a pipeline surfaces as the invocation's failure
//! instead of being masked by the last stage. Execution short-circuits at the
//! first nonzero exit; only the failing invocation's output is retained.

use std::path::PathBuf;
use std::process::Command;

use crate::harness::directive::{self, SubstitutionContext};

/// The six per-test outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Passed,
    Failed,
    Xfailed,
    Xpassed,
    Skipped,
    Unresolved,
}

impl Classification {
    /// Upper-case label used in status lines and summary headers.
    pub fn label(self) -> &'static str {
        match self {
            Classification::Passed => "PASSED",
            Classification::Failed => "FAILED",
            Classification::Xfailed => "XFAILED",
            Classification::Xpassed => "XPASSED",
            Classification::Skipped => "SKIPPED",
            Classification::Unresolved => "UNRESOLVED",
        }
    }
}

/// Outcome of running one test file. Immutable once produced.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Absolute path identifying the test.
    pub test: PathBuf,
    pub classification: Classification,
    /// Exit code of the first failing invocation, 0 when none failed.
    pub exit_code: i32,
    /// Stdout of the first failing invocation, empty otherwise.
    pub stdout: String,
    /// Stderr of the first failing invocation, empty otherwise.
    pub stderr: String,
    /// Transcript of attempted invocations, one `STEP #n:` line each.
    pub steps: Vec<String>,
    /// Reason the directives could not be parsed, for `unresolved` results.
    pub parse_failure: Option<String>,
}

impl ExecutionResult {
    /// Result for a test whose directives could not be parsed.
    pub fn unresolved(test: PathBuf, reason: String) -> Self {
        Self {
            test,
            classification: Classification::Unresolved,
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            steps: Vec::new(),
            parse_failure: Some(reason),
        }
    }
}

/// Apply the outcome table.
///
/// `failure` carries the exit code of the first failing command when one
/// failed. The expected-failure marker only converts an exit code of exactly
/// 1; any other failure stays `failed`.
pub fn classify(directives: usize, failure: Option<i32>, xfail: bool) -> Classification {
    match (directives, failure, xfail) {
        (0, _, _) => Classification::Skipped,
        (_, Some(1), true) => Classification::Xfailed,
        (_, Some(_), _) => Classification::Failed,
        (_, None, true) => Classification::Xpassed,
        (_, None, false) => Classification::Passed,
    }
}

/// Parse and execute one test file end to end.
///
/// Parse failures (including an unreadable file) become an `unresolved`
/// result; they never abort the surrounding run.
pub fn run_test_file(ctx: &SubstitutionContext) -> ExecutionResult {
    match directive::parse_test_file(ctx) {
        Ok(parsed) => execute(ctx.test_file.clone(), &parsed.commands, parsed.xfail),
        Err(e) => ExecutionResult::unresolved(ctx.test_file.clone(), e.to_string()),
    }
}

/// Run expanded command lines in order, stopping at the first failure.
pub fn execute(test: PathBuf, commands: &[String], xfail: bool) -> ExecutionResult {
    let mut steps = Vec::with_capacity(commands.len());
    for (index, command) in commands.iter().enumerate() {
        steps.push(transcript_line(index, command));
        match Command::new("bash").args(["-o", "pipefail", "-c"]).arg(command).output() {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                // signal termination has no code; -1 never matches the
                // xfail rule
                let exit_code = output.status.code().unwrap_or(-1);
                return ExecutionResult {
                    test,
                    classification: classify(commands.len(), Some(exit_code), xfail),
                    exit_code,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    steps,
                    parse_failure: None,
                };
            }
            Err(e) => {
                return ExecutionResult {
                    test,
                    classification: classify(commands.len(), Some(-1), xfail),
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: format!("failed to spawn shell: {e}"),
                    steps,
                    parse_failure: None,
                };
            }
        }
    }
    ExecutionResult {
        test,
        classification: classify(commands.len(), None, xfail),
        exit_code: 0,
        stdout: String::new(),
        stderr: String::new(),
        steps,
        parse_failure: None,
    }
}

fn transcript_line(index: usize, command: &str) -> String {
    format!("STEP #{index}: bash -o pipefail -c {}", shell_quote(command))
}

/// Quote one word the way a POSIX shell would accept it, for transcripts.
fn shell_quote(word: &str) -> String {
    if !word.is_empty() && word.chars().all(is_shell_safe) {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\"'\"'"))
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-')
}
