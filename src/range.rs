//! Resolving and replacing inclusive line ranges addressed by two references.

use crate::annotator::Document;
use crate::error::Error;
use crate::reference;
use crate::types::{Endpoint, HashRef};
use crate::verifier;

/// A verified inclusive span of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    /// One-based last line.
    pub end_line: usize,
    /// The raw lines of the span, without terminators.
    pub lines: Vec<String>,
    /// One-based first line.
    pub start_line: usize,
    /// The span joined with `\n`.
    pub text: String,
}

/// Split replacement text into lines, treating CRLF as LF.
/// An empty replacement is one empty line.
pub(crate) fn replacement_lines(replacement: &str) -> Vec<String> {
    return replacement.replace("\r\n", "\n").split('\n').map(String::from).collect();
}

/// Parse, order-check and verify both endpoints.
///
/// # Errors
///
/// Returns `Error::InvalidReference`, `Error::InvalidRange`,
/// `Error::OutOfRange` or `Error::StaleReference`.
pub fn resolve_range(
    start_ref: &str,
    end_ref: &str,
    content: &str,
    length_override: Option<usize>,
) -> Result<ResolvedRange, Error> {
    let start = reference::parse_hash_ref(start_ref)?;
    let end = reference::parse_hash_ref(end_ref)?;
    let document = Document::parse(content);

    verify_span(&document, &start, &end, length_override)?;

    let lines: Vec<String> = document
        .lines
        .get(start.line.saturating_sub(1)..end.line)
        .unwrap_or_default()
        .iter()
        .map(|l| return (*l).to_string())
        .collect();
    let text = lines.join("\n");

    return Ok(ResolvedRange {
        end_line: end.line,
        lines,
        start_line: start.line,
        text,
    });
}

/// Replace a verified range with `replacement`, keeping the document's line ending.
///
/// An empty `replacement` leaves one empty line where the range was; use a
/// delete edit to remove lines entirely.
///
/// # Errors
///
/// Same as [`resolve_range`].
pub fn replace_range(
    start_ref: &str,
    end_ref: &str,
    content: &str,
    replacement: &str,
    length_override: Option<usize>,
) -> Result<String, Error> {
    let start = reference::parse_hash_ref(start_ref)?;
    let end = reference::parse_hash_ref(end_ref)?;
    let document = Document::parse(content);

    verify_span(&document, &start, &end, length_override)?;

    return Ok(splice(&document, start.line, end.line, &replacement_lines(replacement)));
}

/// Substitute one-based inclusive `[start_line, end_line]` with `insert`.
/// Callers verify the span first.
pub(crate) fn splice(document: &Document<'_>, start_line: usize, end_line: usize, insert: &[String]) -> String {
    let head = document.lines.get(..start_line.saturating_sub(1)).unwrap_or_default();
    let tail = document.lines.get(end_line..).unwrap_or_default();

    let mut lines: Vec<&str> = Vec::with_capacity(head.len().saturating_add(insert.len()).saturating_add(tail.len()));
    lines.extend_from_slice(head);
    lines.extend(insert.iter().map(String::as_str));
    lines.extend_from_slice(tail);

    return document.join(&lines);
}

/// Order-check and verify both endpoints against the same split.
///
/// # Errors
///
/// Returns `Error::InvalidRange` when start is after end, otherwise the first
/// endpoint failure.
pub(crate) fn verify_span(
    document: &Document<'_>,
    start: &HashRef,
    end: &HashRef,
    length_override: Option<usize>,
) -> Result<(), Error> {
    if start.line > end.line {
        return Err(Error::InvalidRange {
            end: end.line,
            start: start.line,
        });
    }

    verifier::verify_lines(start, &document.lines, length_override).into_result(start, Endpoint::Start)?;
    verifier::verify_lines(end, &document.lines, length_override).into_result(end, Endpoint::End)?;
    return Ok(());
}
