//! Test discovery, the worker pool, and result aggregation.
//!
//! Discovery expands path arguments into an ordered, deduplicated list of
//! absolute test paths. A fixed-size worker pool consumes an explicit task
//! queue and delivers results over a channel to a single aggregation point:
//! status lines print as results arrive, and the summary is derived only
//! after every result is in, ordered by discovery index.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use thiserror::Error;

use crate::harness::directive::{SubstitutionContext, SUBJECT_TOOL};
use crate::harness::executor::{self, Classification, ExecutionResult};
use crate::harness::report::{Reporter, Verbosity};

/// Worker pool size used when none is configured.
pub const DEFAULT_WORKERS: usize = 8;

/// Directory scanned when no test paths are given.
pub const DEFAULT_TEST_DIR: &str = "test_sudokus";

/// Failures that abort the run before any test starts.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Unexpected columbo binary name: {name}")]
    UnexpectedBinaryName { name: String },

    #[error("Cannot find columbo binary: {}", path.display())]
    MissingBinary { path: PathBuf },
}

/// Read-only configuration for one harness run, built by the CLI.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Binary under test, as given on the command line.
    pub subject_binary: PathBuf,
    /// Filtered-diff tool invoked by check stages.
    pub check_tool: PathBuf,
    /// Worker pool size.
    pub workers: usize,
    pub verbosity: Verbosity,
    /// Terminal width the status column aligns to.
    pub columns: usize,
    pub use_colors: bool,
}

/// Per-classification identity lists, in discovery order.
#[derive(Debug, Default)]
pub struct Summary {
    passed: Vec<PathBuf>,
    failed: Vec<PathBuf>,
    xpassed: Vec<PathBuf>,
    xfailed: Vec<PathBuf>,
    skipped: Vec<PathBuf>,
    unresolved: Vec<PathBuf>,
}

impl Summary {
    /// Aggregate results. Callers pass results in discovery order, so
    /// buckets keep that order.
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.bucket_mut(result.classification).push(result.test.clone());
        }
        summary
    }

    pub fn members(&self, classification: Classification) -> &[PathBuf] {
        match classification {
            Classification::Passed => &self.passed,
            Classification::Failed => &self.failed,
            Classification::Xpassed => &self.xpassed,
            Classification::Xfailed => &self.xfailed,
            Classification::Skipped => &self.skipped,
            Classification::Unresolved => &self.unresolved,
        }
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.members(classification).len()
    }

    pub fn total(&self) -> usize {
        self.passed.len()
            + self.failed.len()
            + self.xpassed.len()
            + self.xfailed.len()
            + self.skipped.len()
            + self.unresolved.len()
    }

    /// Process exit code: only `failed` tests fail the run.
    pub fn exit_code(&self) -> i32 {
        if self.failed.is_empty() { 0 } else { 1 }
    }

    fn bucket_mut(&mut self, classification: Classification) -> &mut Vec<PathBuf> {
        match classification {
            Classification::Passed => &mut self.passed,
            Classification::Failed => &mut self.failed,
            Classification::Xpassed => &mut self.xpassed,
            Classification::Xfailed => &mut self.xfailed,
            Classification::Skipped => &mut self.skipped,
            Classification::Unresolved => &mut self.unresolved,
        }
    }
}

/// Run the whole suite: precondition check, discovery, parallel execution,
/// aggregation. Status lines and the summary go through `reporter`.
pub fn run<R: Reporter>(
    test_paths: &[PathBuf],
    config: &RunConfig,
    reporter: &mut R,
) -> Result<Summary, SchedulerError> {
    check_subject_binary(&config.subject_binary)?;

    let tests = discover_tests(test_paths);
    tracing::debug!("discovered {} test file(s)", tests.len());

    let results = execute_all(&tests, config, reporter);
    let summary = Summary::from_results(&results);
    reporter.on_run_complete(&summary);
    Ok(summary)
}

/// The binary must be named `columbo` and must exist.
fn check_subject_binary(path: &Path) -> Result<(), SchedulerError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name != SUBJECT_TOOL {
        return Err(SchedulerError::UnexpectedBinaryName { name });
    }
    if !path.exists() {
        return Err(SchedulerError::MissingBinary {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Expand path arguments into an ordered, deduplicated list of absolute test
/// paths. A file argument is taken as-is; a directory contributes its direct
/// `*.txt` children, sorted. First appearance wins.
pub fn discover_tests(test_paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut tests = Vec::new();
    for path in test_paths {
        if path.is_file() {
            push_unique(&mut tests, &mut seen, absolutize(path));
        } else {
            for child in txt_children(path) {
                push_unique(&mut tests, &mut seen, absolutize(&child));
            }
        }
    }
    tests
}

fn push_unique(tests: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>, path: PathBuf) {
    if seen.insert(path.clone()) {
        tests.push(path);
    }
}

/// Direct children matching the test-file pattern, sorted for reproducible
/// reporting. Hidden files are skipped.
fn txt_children(dir: &Path) -> Vec<PathBuf> {
    let mut children = Vec::new();
    match fs::read_dir(dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let path = entry.path();
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
                if !hidden && path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
                    children.push(path);
                }
            }
        }
        Err(e) => {
            tracing::warn!("cannot read test directory {}: {e}", dir.display());
        }
    }
    children.sort();
    children
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Fan tests out over the worker pool. Results reach the reporter in
/// completion order and come back reordered by discovery index.
fn execute_all<R: Reporter>(
    tests: &[PathBuf],
    config: &RunConfig,
    reporter: &mut R,
) -> Vec<ExecutionResult> {
    if tests.is_empty() {
        return Vec::new();
    }

    let subject_binary = absolutize(&config.subject_binary);
    let check_tool = absolutize(&config.check_tool);

    let worker_count = config.workers.clamp(1, tests.len());
    tracing::debug!("running {} test(s) on {} worker(s)", tests.len(), worker_count);

    let (task_tx, task_rx) = mpsc::channel::<(usize, SubstitutionContext)>();
    let task_rx = Arc::new(Mutex::new(task_rx));
    let (result_tx, result_rx) = mpsc::channel::<(usize, ExecutionResult)>();

    for (index, test) in tests.iter().enumerate() {
        let ctx = SubstitutionContext::new(subject_binary.clone(), check_tool.clone(), test.clone());
        let _ = task_tx.send((index, ctx));
    }
    drop(task_tx);

    let mut workers = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let task_rx = Arc::clone(&task_rx);
        let result_tx = result_tx.clone();
        workers.push(thread::spawn(move || {
            loop {
                let task = {
                    let Ok(receiver) = task_rx.lock() else { break };
                    receiver.recv()
                };
                let Ok((index, ctx)) = task else { break };
                let result = executor::run_test_file(&ctx);
                if result_tx.send((index, result)).is_err() {
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    let mut ordered: Vec<Option<ExecutionResult>> = vec![None; tests.len()];
    for (index, result) in result_rx {
        reporter.on_test_complete(&result);
        ordered[index] = Some(result);
    }

    for worker in workers {
        let _ = worker.join();
    }

    ordered.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingReporter {
        completed: Vec<Classification>,
        summaries: usize,
    }

    impl RecordingReporter {
        fn new() -> Self {
            Self {
                completed: Vec::new(),
                summaries: 0,
            }
        }
    }

    impl Reporter for RecordingReporter {
        fn on_test_complete(&mut self, result: &ExecutionResult) {
            self.completed.push(result.classification);
        }

        fn on_run_complete(&mut self, _summary: &Summary) {
            self.summaries += 1;
        }
    }

    fn config(subject: &Path, check: &Path) -> RunConfig {
        RunConfig {
            subject_binary: subject.to_path_buf(),
            check_tool: check.to_path_buf(),
            workers: 2,
            verbosity: Verbosity::Normal,
            columns: 80,
            use_colors: false,
        }
    }

    fn result(path: &str, classification: Classification) -> ExecutionResult {
        ExecutionResult {
            test: PathBuf::from(path),
            classification,
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            steps: Vec::new(),
            parse_failure: None,
        }
    }

    // ========================================
    // Discovery tests
    // ========================================

    #[test]
    fn test_discovery_expands_directories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "1\n").unwrap();
        fs::write(dir.path().join("a.txt"), "1\n").unwrap();
        fs::write(dir.path().join("notes.md"), "n\n").unwrap();
        fs::write(dir.path().join(".hidden.txt"), "1\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.txt"), "1\n").unwrap();

        let tests = discover_tests(&[dir.path().to_path_buf()]);
        let names: Vec<_> = tests
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert!(tests.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_discovery_takes_explicit_files_as_given() {
        // an explicit file argument bypasses the *.txt pattern
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("notes.md");
        fs::write(&md, "n\n").unwrap();

        let tests = discover_tests(&[md]);
        assert_eq!(tests.len(), 1);
    }

    #[test]
    fn test_discovery_collapses_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "1\n").unwrap();

        let tests = discover_tests(&[file.clone(), dir.path().to_path_buf(), file]);
        assert_eq!(tests.len(), 1);
    }

    #[test]
    fn test_discovery_of_missing_directory_is_empty() {
        assert!(discover_tests(&[PathBuf::from("/no/such/dir")]).is_empty());
    }

    // ========================================
    // Precondition tests
    // ========================================

    #[test]
    fn test_misnamed_binary_is_rejected() {
        let mut reporter = RecordingReporter::new();
        let config = config(Path::new("/bin/true"), Path::new("/bin/true"));
        let err = run(&[], &config, &mut reporter).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected columbo binary name: true");
        assert_eq!(reporter.summaries, 0);
    }

    #[test]
    fn test_missing_binary_is_rejected() {
        let mut reporter = RecordingReporter::new();
        let config = config(Path::new("/no/such/columbo"), Path::new("/bin/true"));
        let err = run(&[], &config, &mut reporter).unwrap_err();
        assert_eq!(err.to_string(), "Cannot find columbo binary: /no/such/columbo");
    }

    #[test]
    fn test_name_check_runs_before_existence_check() {
        let mut reporter = RecordingReporter::new();
        let config = config(Path::new("/no/such/tool"), Path::new("/bin/true"));
        let err = run(&[], &config, &mut reporter).unwrap_err();
        assert!(matches!(err, SchedulerError::UnexpectedBinaryName { .. }));
    }

    // ========================================
    // Summary tests
    // ========================================

    #[test]
    fn test_summary_buckets_and_exit_code() {
        let summary = Summary::from_results(&[
            result("/a.txt", Classification::Passed),
            result("/b.txt", Classification::Xpassed),
            result("/c.txt", Classification::Unresolved),
        ]);
        assert_eq!(summary.count(Classification::Passed), 1);
        assert_eq!(summary.total(), 3);
        // neither xpassed nor unresolved fails the run
        assert_eq!(summary.exit_code(), 0);

        let summary = Summary::from_results(&[result("/d.txt", Classification::Failed)]);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(
            summary.members(Classification::Failed),
            vec![PathBuf::from("/d.txt")]
        );
    }

    // ========================================
    // End-to-end scheduling tests
    // ========================================

    #[test]
    fn test_empty_run_summarizes_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let subject = dir.path().join("columbo");
        fs::write(&subject, "").unwrap();

        let mut reporter = RecordingReporter::new();
        let summary = run(&[], &config(&subject, Path::new("/bin/true")), &mut reporter).unwrap();
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(reporter.summaries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_mixed_outcomes_across_the_pool() {
        use std::os::unix::fs::PermissionsExt;

        let bin_dir = tempfile::tempdir().unwrap();
        let subject = bin_dir.path().join("columbo");
        fs::write(&subject, "#!/bin/bash\nexit \"${1:-0}\"\n").unwrap();
        let mut perms = fs::metadata(&subject).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&subject, perms).unwrap();

        let suite = tempfile::tempdir().unwrap();
        fs::write(suite.path().join("a_pass.txt"), "# RUN: columbo 0\n1 2 3\n").unwrap();
        fs::write(suite.path().join("b_fail.txt"), "# RUN: columbo 2\n1 2 3\n").unwrap();
        fs::write(suite.path().join("c_xfail.txt"), "# XFAIL:\n# RUN: columbo 1\n1 2 3\n").unwrap();
        fs::write(suite.path().join("d_skip.txt"), "1 2 3\n").unwrap();
        fs::write(suite.path().join("e_bad.txt"), "# RUN: grep foo %s\n1 2 3\n").unwrap();

        let mut reporter = RecordingReporter::new();
        let summary = run(
            &[suite.path().to_path_buf()],
            &config(&subject, Path::new("/bin/true")),
            &mut reporter,
        )
        .unwrap();

        assert_eq!(summary.count(Classification::Passed), 1);
        assert_eq!(summary.count(Classification::Failed), 1);
        assert_eq!(summary.count(Classification::Xfailed), 1);
        assert_eq!(summary.count(Classification::Skipped), 1);
        assert_eq!(summary.count(Classification::Unresolved), 1);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(reporter.completed.len(), 5);
        assert_eq!(reporter.summaries, 1);
        assert!(summary.members(Classification::Failed)[0].ends_with("b_fail.txt"));
    }
}
