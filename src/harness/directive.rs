//! Directive extraction and substitution.
//!
//! A test file opens with a block of `#` comments. Inside that block,
//! `# RUN:` lines carry shell pipelines to execute and `# XFAIL:` marks the
//! test as expected to fail. The first line that does not start with `#`
//! ends the block; everything after it is test payload and never read.
//!
//! ## Substitution
//!
//! Directive text is rewritten by a fixed sequence of global replacements:
//! whole-word `columbo` and `columbo_check` become the tool paths, `%S` the
//! test file's directory, `%s` the test file itself, and `%%` a literal `%`.
//! Any `%` still followed by a word character after that is a typo and
//! rejected before anything reaches the shell.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::lines::LineSource;

/// Token a pipeline stage uses to invoke the binary under test.
pub const SUBJECT_TOOL: &str = "columbo";
/// Token a pipeline stage uses to invoke the filtered-diff tool.
pub const CHECK_TOOL: &str = "columbo_check";

const RUN_PREFIX: &str = "# RUN:";
const XFAIL_PREFIX: &str = "# XFAIL:";

/// Errors that stop a test file's directives from becoming runnable commands.
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("stage '{stage}' does not run either 'columbo' or 'columbo_check'")]
    MalformedDirective { stage: String },

    #[error("unrecognized substitution '{token}'")]
    UnknownSubstitution { token: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-test immutable path bindings used to expand directive text.
#[derive(Debug, Clone)]
pub struct SubstitutionContext {
    /// Absolute path of the binary under test.
    pub subject_binary: PathBuf,
    /// Absolute path of the filtered-diff tool.
    pub check_tool: PathBuf,
    /// Absolute path of the test file.
    pub test_file: PathBuf,
    /// Absolute path of the directory containing the test file.
    pub test_dir: PathBuf,
}

impl SubstitutionContext {
    /// Bind the per-test paths. `test_file` is expected to be absolute.
    pub fn new(subject_binary: PathBuf, check_tool: PathBuf, test_file: PathBuf) -> Self {
        let test_dir = test_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        Self {
            subject_binary,
            check_tool,
            test_file,
            test_dir,
        }
    }
}

/// A test file's directives after extraction and substitution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTestFile {
    /// Fully expanded shell command lines, in file order.
    pub commands: Vec<String>,
    /// Whether the file carries the expected-failure marker.
    pub xfail: bool,
}

/// Parse a test file from disk.
///
/// Read failures surface as [`DirectiveError::Io`]; the caller classifies the
/// test `unresolved` either way.
pub fn parse_test_file(ctx: &SubstitutionContext) -> Result<ParsedTestFile, DirectiveError> {
    parse_lines(LineSource::file(&ctx.test_file).open()?, ctx)
}

/// Parse directives out of in-memory file contents.
pub fn parse_source(source: &str, ctx: &SubstitutionContext) -> Result<ParsedTestFile, DirectiveError> {
    parse_lines(source.lines().map(|line| Ok(line.to_string())), ctx)
}

/// Parse directives from a raw line stream.
///
/// Scanning covers the whole leading comment block: `# XFAIL:` sets the
/// expectation marker, `# RUN:` lines become commands, other comments are
/// skipped. The first non-comment line (empty lines included) ends the scan.
pub fn parse_lines<I>(lines: I, ctx: &SubstitutionContext) -> Result<ParsedTestFile, DirectiveError>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut parsed = ParsedTestFile::default();
    for line in lines {
        let line = line?;
        if !line.starts_with('#') {
            break;
        }
        if line.starts_with(XFAIL_PREFIX) {
            parsed.xfail = true;
        } else if line.starts_with(RUN_PREFIX) {
            let directive = line[RUN_PREFIX.len()..].trim_start();
            validate_stages(directive)?;
            parsed.commands.push(expand(directive, ctx)?);
        }
    }
    Ok(parsed)
}

/// Every pipeline stage must start with a permitted tool name as a whole word.
fn validate_stages(directive: &str) -> Result<(), DirectiveError> {
    for stage in directive.split('|') {
        let stage = stage.trim_start();
        if !starts_with_word(stage, SUBJECT_TOOL) && !starts_with_word(stage, CHECK_TOOL) {
            return Err(DirectiveError::MalformedDirective {
                stage: stage.trim_end().to_string(),
            });
        }
    }
    Ok(())
}

/// Apply the fixed substitution sequence and reject leftover `%` tokens.
fn expand(directive: &str, ctx: &SubstitutionContext) -> Result<String, DirectiveError> {
    let line = replace_word(directive, SUBJECT_TOOL, &ctx.subject_binary.to_string_lossy());
    let line = replace_word(&line, CHECK_TOOL, &ctx.check_tool.to_string_lossy());
    let line = line.replace("%S", &ctx.test_dir.to_string_lossy());
    let line = line.replace("%s", &ctx.test_file.to_string_lossy());
    let line = line.replace("%%", "%");
    if let Some(token) = find_unknown_token(&line) {
        return Err(DirectiveError::UnknownSubstitution { token });
    }
    Ok(line.trim_end().to_string())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `text` starts with `word` followed by a word boundary.
fn starts_with_word(text: &str, word: &str) -> bool {
    match text.strip_prefix(word) {
        Some(rest) => !rest.starts_with(is_word_char),
        None => false,
    }
}

/// Replace every whole-word occurrence of `word` in a single left-to-right
/// pass. Replacement text is never rescanned, so a tool path containing the
/// token does not cascade.
fn replace_word(text: &str, word: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut searched = 0;
    while let Some(pos) = text[searched..].find(word) {
        let start = searched + pos;
        let end = start + word.len();
        let boundary_before = text[..start].chars().next_back().is_none_or(|c| !is_word_char(c));
        let boundary_after = text[end..].chars().next().is_none_or(|c| !is_word_char(c));
        if boundary_before && boundary_after {
            out.push_str(&text[searched..start]);
            out.push_str(replacement);
            searched = end;
        } else {
            let step = text[start..].chars().next().map_or(1, char::len_utf8);
            out.push_str(&text[searched..start + step]);
            searched = start + step;
        }
    }
    out.push_str(&text[searched..]);
    out
}

/// Find the first `%` immediately followed by a word character.
fn find_unknown_token(line: &str) -> Option<String> {
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if let Some(&next) = chars.peek() {
                if is_word_char(next) {
                    return Some(format!("%{next}"));
                }
            }
        }
    }
    None
}
