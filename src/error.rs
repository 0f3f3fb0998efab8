/// Crate-level error types for hashline diagnostics.
use std::path::PathBuf;

use crate::types::{EditKind, Endpoint};

/// All errors in hashline carry enough context to produce a useful diagnostic
/// without a debugger. Core variants never leave a document partially edited.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported as hashline::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Content exceeds the configured size limit and will not be annotated.
    #[error("file too large ({size_bytes} bytes, max {max_bytes}): {}", file.display())]
    FileTooLarge {
        /// File that exceeded the size limit.
        file: PathBuf,
        /// Maximum allowed size in bytes.
        max_bytes: u64,
        /// Actual size in bytes (UTF-8).
        size_bytes: u64,
    },

    /// A config value parsed but is outside what the key accepts.
    #[error("invalid config: `{key}` {reason}")]
    InvalidConfig {
        /// The offending key in `.hashline.toml`.
        key: String,
        /// What the key accepts.
        reason: String,
    },

    /// An exclude pattern is not a valid glob.
    #[error("invalid glob `{pattern}`: {reason}")]
    InvalidGlob {
        /// The offending pattern.
        pattern: String,
        /// Parser message from the glob compiler.
        reason: String,
    },

    /// Range endpoints are out of order.
    #[error("invalid range: start line {start} is after end line {end}")]
    InvalidRange {
        /// One-based end line.
        end: usize,
        /// One-based start line.
        start: usize,
    },

    /// Reference text is not `<line>:<hash>` or an annotated line.
    #[error("invalid reference: `{reference}` (expected `<line>:<hash>`, e.g. `12:a3f`)")]
    InvalidReference {
        /// The text that failed to parse.
        reference: String,
    },

    /// Underlying I/O error from the filesystem or stdio.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A replace or insert was requested without replacement text.
    #[error("{operation} requires replacement text")]
    MissingReplacement {
        /// The operation that needs content.
        operation: EditKind,
    },

    /// A reference names a line outside the document.
    #[error("{endpoint} line {line} is out of range (document has {line_count} lines)")]
    OutOfRange {
        /// Which reference failed.
        endpoint: Endpoint,
        /// One-based line number from the reference.
        line: usize,
        /// Number of lines in the current document.
        line_count: usize,
    },

    /// The referenced line changed since its tag was produced.
    #[error("{endpoint} {line}:{expected} is stale (line {line} now hashes to {actual})")]
    StaleReference {
        /// Hash of the line in the current document.
        actual: String,
        /// Which reference failed.
        endpoint: Endpoint,
        /// Hash carried by the reference.
        expected: String,
        /// One-based line number from the reference.
        line: usize,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
