//! Line selection and normalization for filtered comparison.
//!
//! Solver output is compared against a check file loosely: comment lines are
//! ignored entirely and horizontal whitespace at either end of a line carries
//! no meaning. Blank lines still count.

use std::io;

/// Returns true when a line takes part in the comparison.
///
/// Lines whose first non-whitespace character is `#` are comments and are
/// dropped from both sides before diffing.
pub fn is_comparable(line: &str) -> bool {
    !line.trim_start().starts_with('#')
}

/// Strip leading and trailing spaces and tabs.
///
/// Other whitespace is left alone; the inputs are terminator-free lines, so
/// newlines never appear here.
pub fn normalize(line: &str) -> &str {
    line.trim_matches([' ', '\t'])
}

/// Collect the comparable, normalized lines out of a raw line stream.
///
/// The first read error aborts the collection.
pub fn filter_lines<I>(lines: I) -> io::Result<Vec<String>>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut filtered = Vec::new();
    for line in lines {
        let line = line?;
        if is_comparable(&line) {
            filtered.push(normalize(&line).to_string());
        }
    }
    Ok(filtered)
}
