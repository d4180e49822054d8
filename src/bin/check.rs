//! Check tool binary entry point
//!
//! Run with: columbo_check CHECK_FILE [--input-file PATH]
//!
//! Reads candidate output from stdin unless --input-file is given, and
//! compares it against the check file ignoring comments and indentation.

fn main() {
    // Initialize structured logging with env-based filter, defaulting to info.
    // Logs go to stderr; stdout must stay clean inside a test pipeline.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    columbo_test::cli::check::run_check();
}
