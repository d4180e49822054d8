//! Result presentation.
//!
//! ## Reporter Trait
//!
//! The scheduler reports through a [`Reporter`] trait so execution stays
//! separate from presentation and tests can capture results without a
//! terminal. [`ConsoleReporter`] is the default: one status line per test on
//! stdout, diagnostics on stderr, and the summary block on stdout.

use crate::harness::executor::{Classification, ExecutionResult};
use crate::harness::scheduler::{RunConfig, Summary};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Brackets plus the widest status label.
const STATUS_FIELD_WIDTH: usize = 12;

/// How much diagnostic detail accompanies status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Diagnostics for `failed` tests only.
    #[default]
    Normal,
    /// Adds diagnostics for `xfailed` tests and the parse reason for
    /// `unresolved` ones.
    Verbose,
    /// Adds the step transcript for passing tests as well.
    VeryVerbose,
}

/// Receives per-test results and the final summary.
///
/// Implement this trait to customize output format (JSON, TAP, etc.)
pub trait Reporter {
    /// Called as soon as one test's result is known. Calls may interleave
    /// across workers in completion order.
    fn on_test_complete(&mut self, result: &ExecutionResult);

    /// Called once, after every result is in.
    fn on_run_complete(&mut self, summary: &Summary);
}

/// Default console reporter.
pub struct ConsoleReporter {
    pub verbosity: Verbosity,
    /// Width the status field right-aligns to.
    pub columns: usize,
    pub use_colors: bool,
}

impl ConsoleReporter {
    pub fn new(verbosity: Verbosity, columns: usize, use_colors: bool) -> Self {
        Self {
            verbosity,
            columns,
            use_colors,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.verbosity, config.columns, config.use_colors)
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// `<path><padding>[<STATUS>]`, right-anchoring the status field at the
    /// configured width. Long paths collapse the padding, never the path.
    fn status_line(&self, result: &ExecutionResult) -> String {
        let path = result.test.display().to_string();
        let pad = self.columns.saturating_sub(path.len() + STATUS_FIELD_WIDTH);
        let label = result.classification.label();
        format!(
            "{path}{}[{}]",
            " ".repeat(pad),
            self.colorize(label, color(result.classification))
        )
    }
}

impl Reporter for ConsoleReporter {
    fn on_test_complete(&mut self, result: &ExecutionResult) {
        println!("{}", self.status_line(result));
        match result.classification {
            Classification::Failed => eprintln!("{}", failure_block(result)),
            Classification::Xfailed if self.verbosity >= Verbosity::Verbose => {
                eprintln!("{}", failure_block(result));
            }
            Classification::Unresolved if self.verbosity >= Verbosity::Verbose => {
                if let Some(reason) = &result.parse_failure {
                    eprintln!("\tCould not parse run line: {reason}");
                }
            }
            Classification::Passed | Classification::Xpassed
                if self.verbosity >= Verbosity::VeryVerbose && !result.steps.is_empty() =>
            {
                eprintln!("{}", result.steps.join("\n"));
            }
            _ => {}
        }
    }

    fn on_run_complete(&mut self, summary: &Summary) {
        print!("{}", render_summary(summary));
    }
}

fn color(classification: Classification) -> &'static str {
    match classification {
        Classification::Passed => GREEN,
        Classification::Failed => RED,
        Classification::Xfailed => BLUE,
        Classification::Xpassed => CYAN,
        Classification::Skipped | Classification::Unresolved => YELLOW,
    }
}

/// Step transcript, then the failing invocation's exit code and any output.
fn failure_block(result: &ExecutionResult) -> String {
    let mut block = Vec::new();
    if !result.steps.is_empty() {
        block.push(result.steps.join("\n"));
    }
    block.push(format!("RETCODE: {}", result.exit_code));
    if !result.stdout.is_empty() {
        block.push("PROCESS STDOUT:".to_string());
        block.push(result.stdout.clone());
    }
    if !result.stderr.is_empty() {
        block.push("PROCESS STDERR:".to_string());
        block.push(result.stderr.clone());
    }
    block.join("\n")
}

/// Render the summary block: identity sections for non-empty non-passed
/// buckets, then counts for all six classifications.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::from("=== SUMMARY ===\n");
    for classification in [
        Classification::Unresolved,
        Classification::Skipped,
        Classification::Xpassed,
        Classification::Xfailed,
        Classification::Failed,
    ] {
        let members = summary.members(classification);
        if !members.is_empty() {
            out.push_str(&format!("  {} TESTS:\n", classification.label()));
            for test in members {
                out.push_str(&format!("\t{}\n", test.display()));
            }
        }
    }
    for classification in [
        Classification::Passed,
        Classification::Failed,
        Classification::Xpassed,
        Classification::Xfailed,
        Classification::Skipped,
        Classification::Unresolved,
    ] {
        out.push_str(&format!(
            "  {}: {}\n",
            classification.label(),
            summary.count(classification)
        ));
    }
    out
}
