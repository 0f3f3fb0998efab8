/// Core domain types for hashline references and edits.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::reference;

/// Edit requested against a document, addressed by hash references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashEdit {
    /// Inclusive end of a replace/delete range. Defaults to `start_ref`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ref: Option<String>,
    /// Which of the four operations to perform.
    pub operation: EditKind,
    /// Replacement or inserted text. Required for everything but delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// Bare `<line>:<hash>` reference or a full annotated line.
    pub start_ref: String,
}

/// The four structural edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum EditKind {
    /// Remove the range entirely.
    Delete,
    /// Splice new lines after the referenced line.
    InsertAfter,
    /// Splice new lines before the referenced line.
    InsertBefore,
    /// Substitute the range with new lines.
    Replace,
}

impl EditKind {
    /// Wire name, matching the serde representation.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::Delete => "delete",
            Self::InsertAfter => "insert_after",
            Self::InsertBefore => "insert_before",
            Self::Replace => "replace",
        };
    }

    /// Whether the operation carries replacement text.
    pub const fn needs_replacement(self) -> bool {
        return !matches!(self, Self::Delete);
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.as_str());
    }
}

/// Outcome of a successful edit, ready for the host to write back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResult {
    /// The full edited document, original line endings preserved.
    pub content: String,
    /// One-based last line of the verified span.
    pub end_line: usize,
    /// The operation that was applied.
    pub operation: EditKind,
    /// One-based first line of the verified span.
    pub start_line: usize,
}

/// Which reference of a request failed verification. Only used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// End of a range.
    End,
    /// Start of a range, or the anchor of an insert.
    Start,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(match self {
            Self::End => "end reference",
            Self::Start => "start reference",
        });
    }
}

/// A `<line>:<hash>` pointer. Line numbers are one-based.
/// Only constructed through parsing, so the hash is always 2–8 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashRef {
    /// Lowercase hex tag.
    pub hash: String,
    /// One-based line number.
    pub line: usize,
}

impl fmt::Display for HashRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}:{}", self.line, self.hash);
    }
}

impl FromStr for HashRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return reference::parse_hash_ref(s);
    }
}
