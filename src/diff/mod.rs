//! Filtered output comparison (the check half of a test pipeline).
//!
//! Solver output is judged against a check file with two relaxations:
//! - comment lines (first non-whitespace character `#`) are ignored
//! - leading and trailing spaces and tabs are ignored
//!
//! Everything else, including blank lines, must match exactly. Mismatches are
//! reported as a unified diff.

mod compare;
mod filter;

pub use compare::{compare, Comparison};
pub use filter::{filter_lines, is_comparable, normalize};

use std::io;

use crate::lines::LineSource;

/// Read, filter, and normalize every comparable line of a source.
pub fn filter_source(source: &LineSource) -> io::Result<Vec<String>> {
    filter_lines(source.open()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_filter_source_reads_a_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "# comment\n  7 7 7\n").unwrap();

        let lines = filter_source(&LineSource::file(tmp.path())).unwrap();
        assert_eq!(lines, vec!["7 7 7"]);
    }

    #[test]
    fn test_end_to_end_match_ignores_comments_and_spacing() {
        let check = filter_lines(vec![Ok("# layout".to_string()), Ok("1 2".to_string())]).unwrap();
        let input = filter_lines(vec![
            Ok("  1 2\t".to_string()),
            Ok("# a different comment".to_string()),
        ])
        .unwrap();
        assert!(compare(&check, &input).is_match());
    }
}
