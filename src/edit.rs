//! Hash-verified replace, delete and insert edits.

use crate::annotator::Document;
use crate::error::Error;
use crate::range::{self, replacement_lines};
use crate::reference;
use crate::types::{EditKind, EditResult, Endpoint, HashEdit};
use crate::verifier;

/// Apply one edit to `content` and return the new document.
///
/// References may be bare (`12:a3f`) or whole annotated lines. Every
/// reference the operation depends on is verified against `content` first;
/// if any check fails nothing is edited and the error is returned. The
/// document's line ending is reapplied to the output.
///
/// Replace and delete address the inclusive range `start_ref..=end_ref`
/// (`end_ref` defaults to `start_ref`). Inserts only look at `start_ref`.
///
/// # Errors
///
/// Returns `Error::MissingReplacement`, `Error::InvalidReference`,
/// `Error::InvalidRange`, `Error::OutOfRange` or `Error::StaleReference`.
pub fn apply_hash_edit(
    edit: &HashEdit,
    content: &str,
    length_override: Option<usize>,
) -> Result<EditResult, Error> {
    let replacement = match (&edit.replacement, edit.operation.needs_replacement()) {
        (None, true) => {
            return Err(Error::MissingReplacement {
                operation: edit.operation,
            });
        },
        (Some(text), true) => replacement_lines(text),
        (_, false) => Vec::new(),
    };

    let start = reference::resolve_hash_ref(&edit.start_ref)?;
    let document = Document::parse(content);

    let (start_line, end_line, output) = match edit.operation {
        EditKind::Delete | EditKind::Replace => {
            let end = match &edit.end_ref {
                Some(end_ref) => reference::resolve_hash_ref(end_ref)?,
                None => start.clone(),
            };
            range::verify_span(&document, &start, &end, length_override)?;
            (start.line, end.line, range::splice(&document, start.line, end.line, &replacement))
        },
        EditKind::InsertAfter | EditKind::InsertBefore => {
            if edit.end_ref.is_some() {
                tracing::debug!(operation = %edit.operation, "ignoring end reference on insert");
            }
            verifier::verify_lines(&start, &document.lines, length_override)
                .into_result(&start, Endpoint::Start)?;
            (start.line, start.line, insert_at(&document, edit.operation, start.line, &replacement))
        },
    };

    return Ok(EditResult {
        content: output,
        end_line,
        operation: edit.operation,
        start_line,
    });
}

/// Splice `insert` next to the verified one-based `anchor` line.
fn insert_at(document: &Document<'_>, operation: EditKind, anchor: usize, insert: &[String]) -> String {
    let split_at = match operation {
        EditKind::InsertAfter => anchor,
        _ => anchor.saturating_sub(1),
    };

    let head = document.lines.get(..split_at).unwrap_or_default();
    let tail = document.lines.get(split_at..).unwrap_or_default();

    let mut lines: Vec<&str> = Vec::with_capacity(document.line_count().saturating_add(insert.len()));
    lines.extend_from_slice(head);
    lines.extend(insert.iter().map(String::as_str));
    lines.extend_from_slice(tail);

    return document.join(&lines);
}
