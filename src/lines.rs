//! Lazy line access over check-tool inputs.
//!
//! The check tool reads its reference lines from a file and the lines under
//! test from either a file or standard input. Both paths go through
//! [`LineSource`] so the filtering code never cares where lines come from and
//! inputs are streamed instead of buffered whole.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Where a stream of lines comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSource {
    /// Read from a file on disk.
    File(PathBuf),
    /// Read from the process's standard input.
    Stdin,
}

impl LineSource {
    /// Build a file-backed source.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        LineSource::File(path.into())
    }

    /// Open the source and return an iterator over its lines.
    ///
    /// Line terminators are stripped by the iterator. A file source can be
    /// opened any number of times; standard input can only be consumed once
    /// per process.
    pub fn open(&self) -> io::Result<io::Lines<Box<dyn BufRead>>> {
        let reader: Box<dyn BufRead> = match self {
            LineSource::File(path) => Box::new(BufReader::new(File::open(path)?)),
            LineSource::Stdin => Box::new(io::stdin().lock()),
        };
        Ok(reader.lines())
    }
}

impl fmt::Display for LineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineSource::File(path) => write!(f, "{}", path.display()),
            LineSource::Stdin => write!(f, "<stdin>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_file_source_yields_lines_without_terminators() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "first\nsecond\r\nthird").unwrap();

        let source = LineSource::file(tmp.path());
        let lines: Vec<String> = source.open().unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_file_source_reopens_from_the_start() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "only\n").unwrap();

        let source = LineSource::file(tmp.path());
        for _ in 0..2 {
            let lines: Vec<String> = source.open().unwrap().collect::<Result<_, _>>().unwrap();
            assert_eq!(lines, vec!["only"]);
        }
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let source = LineSource::file("/no/such/file/anywhere.txt");
        assert!(source.open().is_err());
    }

    #[test]
    fn test_display_names_the_source() {
        assert_eq!(LineSource::Stdin.to_string(), "<stdin>");
        assert_eq!(LineSource::file("checks/a.txt").to_string(), "checks/a.txt");
    }
}
