//! Checking a reference against the current document snapshot.

use crate::annotator::Document;
use crate::error::Error;
use crate::hasher;
use crate::types::{Endpoint, HashRef};

/// Outcome of checking one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The line still hashes to the reference's tag.
    Fresh,
    /// The line number is outside `1..=line_count`.
    OutOfRange {
        /// Lines in the snapshot that was checked.
        line_count: usize,
    },
    /// The line changed since the tag was produced.
    Stale {
        /// What the line hashes to now.
        actual: String,
        /// What the reference claimed.
        expected: String,
    },
}

impl Verification {
    /// Convert a failed check into the matching error for `reference`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` or `Error::StaleReference` for anything
    /// other than `Verification::Fresh`.
    pub fn into_result(self, reference: &HashRef, endpoint: Endpoint) -> Result<(), Error> {
        return match self {
            Self::Fresh => Ok(()),
            Self::OutOfRange { line_count } => Err(Error::OutOfRange {
                endpoint,
                line: reference.line,
                line_count,
            }),
            Self::Stale { actual, expected } => Err(Error::StaleReference {
                actual,
                endpoint,
                expected,
                line: reference.line,
            }),
        };
    }

    /// True only for `Verification::Fresh`.
    pub const fn is_fresh(&self) -> bool {
        return matches!(self, Self::Fresh);
    }
}

/// Check `reference` against pre-split lines.
///
/// The recomputation length is the reference's own hash length unless
/// overridden, so tags produced while a file was small keep verifying after
/// it grows past the adaptive threshold.
pub fn verify_lines<S: AsRef<str>>(
    reference: &HashRef,
    lines: &[S],
    length_override: Option<usize>,
) -> Verification {
    let line_count = lines.len();
    let index = reference.line.checked_sub(1);
    let Some(line) = index.and_then(|i| return lines.get(i)) else {
        return Verification::OutOfRange { line_count };
    };

    let length = length_override.unwrap_or(reference.hash.len());
    let actual = hasher::compute_line_hash(index.unwrap_or(0), line.as_ref(), length);

    if actual == reference.hash {
        return Verification::Fresh;
    }

    tracing::debug!(reference = %reference, %actual, "stale reference");
    return Verification::Stale {
        actual,
        expected: reference.hash.clone(),
    };
}

/// Check whether line `line_number` of `content` still hashes to `hash`.
///
/// `precomputed_lines` skips re-splitting when the caller already holds the
/// split document.
pub fn verify_hash(
    line_number: usize,
    hash: &str,
    content: &str,
    length_override: Option<usize>,
    precomputed_lines: Option<&[&str]>,
) -> Verification {
    let reference = HashRef {
        hash: hash.to_string(),
        line: line_number,
    };

    if let Some(lines) = precomputed_lines {
        return verify_lines(&reference, lines, length_override);
    }

    let document = Document::parse(content);
    return verify_lines(&reference, &document.lines, length_override);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::compute_line_hash;

    const CONTENT: &str = "line one\nline two\nline three";

    #[test]
    fn fresh_reference_verifies() {
        let hash = compute_line_hash(1, "line two", 3);
        assert_eq!(verify_hash(2, &hash, CONTENT, None, None), Verification::Fresh);
    }

    #[test]
    fn changed_line_reports_expected_and_actual() {
        let hash = compute_line_hash(1, "line two", 3);
        let edited = "line one\nline 2\nline three";
        let outcome = verify_hash(2, &hash, edited, None, None);
        assert_eq!(
            outcome,
            Verification::Stale {
                actual: compute_line_hash(1, "line 2", 3),
                expected: hash,
            }
        );
    }

    #[test]
    fn trailing_whitespace_edit_is_not_stale() {
        let hash = compute_line_hash(1, "line two", 3);
        assert!(verify_hash(2, &hash, "line one\nline two   \nline three", None, None).is_fresh());
    }

    #[test]
    fn out_of_range() {
        assert_eq!(verify_hash(0, "abc", CONTENT, None, None), Verification::OutOfRange { line_count: 3 });
        assert_eq!(verify_hash(4, "abc", CONTENT, None, None), Verification::OutOfRange { line_count: 3 });
    }

    #[test]
    fn uses_the_reference_length_after_growth() {
        let hash = compute_line_hash(0, "header", 3);
        let grown: String = std::iter::once("header".to_string())
            .chain((1..5000).map(|i| format!("row {i}")))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(verify_hash(1, &hash, &grown, None, None).is_fresh());
    }

    #[test]
    fn precomputed_lines_take_priority() {
        let hash = compute_line_hash(0, "other", 3);
        let lines = ["other"];
        assert!(verify_hash(1, &hash, "ignored", None, Some(&lines)).is_fresh());
    }

    #[test]
    fn explicit_length_override() {
        let hash = compute_line_hash(0, "x", 5);
        assert!(!verify_hash(1, &hash, "x", Some(3), None).is_fresh());
        assert!(verify_hash(1, &hash, "x", Some(5), None).is_fresh());
    }

    #[test]
    fn into_result_names_the_endpoint() {
        let reference = HashRef { hash: "abc".to_string(), line: 9 };
        let err = Verification::OutOfRange { line_count: 3 }
            .into_result(&reference, Endpoint::End)
            .unwrap_err();
        assert!(err.to_string().starts_with("end reference line 9"));
    }
}
