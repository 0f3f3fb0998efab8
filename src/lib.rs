//! Content-hashed line references for safe machine-driven edits.
//!
//! Every line of a document is tagged `<n>:<hash>|`, where the hash covers the
//! line's index and its content without trailing whitespace. Edits name lines
//! by those tags and are refused when a tag no longer matches, so a caller can
//! only change text it has actually seen.
//!
//! ```
//! use hashline::{EditKind, HashEdit, apply_hash_edit, compute_line_hash};
//!
//! let content = "line one\nline two\nline three";
//! let edit = HashEdit {
//!     end_ref: None,
//!     operation: EditKind::Replace,
//!     replacement: Some("X".to_string()),
//!     start_ref: format!("2:{}", compute_line_hash(1, "line two", 3)),
//! };
//! let result = apply_hash_edit(&edit, content, None).unwrap();
//! assert_eq!(result.content, "line one\nX\nline three");
//! ```

pub mod annotator;
pub mod cache;
pub mod edit;
pub mod error;
pub mod filter;
pub mod hasher;
pub mod range;
pub mod reference;
pub mod types;
pub mod verifier;

pub use annotator::{DEFAULT_PREFIX, Document, LineEnding, annotate, strip, strip_value};
pub use cache::AnnotationCache;
pub use edit::apply_hash_edit;
pub use error::Error;
pub use filter::{PathFilter, should_exclude};
pub use hasher::{adaptive_hash_length, compute_line_hash};
pub use range::{ResolvedRange, replace_range, resolve_range};
pub use reference::{build_hash_map, normalize_hash_ref, parse_hash_ref};
pub use types::{EditKind, EditResult, Endpoint, HashEdit, HashRef};
pub use verifier::{Verification, verify_hash};
