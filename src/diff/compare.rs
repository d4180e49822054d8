//! Unified-diff comparison of filtered line sequences.

use similar::TextDiff;

/// Outcome of comparing filtered input lines against a check file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// The filtered line sequences are identical.
    Match,
    /// The sequences differ; `diff` is a unified diff describing how.
    Mismatch { diff: String },
}

impl Comparison {
    /// Returns true when both sides carried the same filtered lines.
    pub fn is_match(&self) -> bool {
        matches!(self, Comparison::Match)
    }
}

/// Compare filtered input lines against filtered check-file lines.
///
/// The rendered diff labels the check file as the old side and the input as
/// the new side, so `+` marks lines the input added and `-` marks lines it
/// lost.
pub fn compare(check_lines: &[String], input_lines: &[String]) -> Comparison {
    if check_lines == input_lines {
        return Comparison::Match;
    }

    let check_text = to_text(check_lines);
    let input_text = to_text(input_lines);
    let text_diff = TextDiff::from_lines(check_text.as_str(), input_text.as_str());
    let diff = text_diff
        .unified_diff()
        .header("check_file", "input")
        .to_string();
    Comparison::Mismatch { diff }
}

fn to_text(lines: &[String]) -> String {
    let mut text = String::with_capacity(lines.iter().map(|line| line.len() + 1).sum());
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_sequences_match() {
        let lines = vec!["1 2".to_string(), "3 4".to_string()];
        assert_eq!(compare(&lines, &lines.clone()), Comparison::Match);
        assert!(compare(&lines, &lines.clone()).is_match());
    }

    #[test]
    fn test_empty_sequences_match() {
        let none: Vec<String> = Vec::new();
        assert_eq!(compare(&none, &none), Comparison::Match);
    }

    #[test]
    fn test_mismatch_renders_a_unified_diff() {
        let check = vec!["1 2 3".to_string()];
        let input = vec!["1 2 4".to_string()];
        match compare(&check, &input) {
            Comparison::Mismatch { diff } => {
                assert!(diff.contains("--- check_file"));
                assert!(diff.contains("+++ input"));
                assert!(diff.contains("-1 2 3"));
                assert!(diff.contains("+1 2 4"));
            }
            Comparison::Match => panic!("expected a mismatch"),
        }
    }

    #[test]
    fn test_missing_line_shows_as_removal() {
        let check = vec!["a".to_string(), "b".to_string()];
        let input = vec!["a".to_string()];
        match compare(&check, &input) {
            Comparison::Mismatch { diff } => assert!(diff.contains("-b")),
            Comparison::Match => panic!("expected a mismatch"),
        }
    }

    #[test]
    fn test_blank_line_count_is_significant() {
        let check = vec!["x".to_string(), String::new()];
        let input = vec!["x".to_string()];
        assert!(!compare(&check, &input).is_match());
    }
}
