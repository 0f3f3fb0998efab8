//! Parsing `<line>:<hash>` references, bare or lifted out of an annotated line.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::annotator::Document;
use crate::error::Error;
use crate::hasher;
use crate::types::HashRef;

/// Reference embedded at the start of an annotated line, after an optional
/// patch marker and any prefix.
static ANNOTATED_REF: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^(?:[+\- ])?.*?(\d+:[0-9a-fA-F]{2,8})\|").expect("valid regex");
});

/// A bare reference, case-insensitive so it can be normalised.
static BARE_REF_ANY_CASE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^\d+:[0-9a-fA-F]{2,8}$").expect("valid regex"));

/// A canonical bare reference.
static CANONICAL_REF: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"^(\d+):([0-9a-f]{2,8})$").expect("valid regex"));

/// Map every line's canonical reference to its one-based line number.
///
/// Uses the adaptive (or overridden) length for every line and does not
/// widen collisions, so it is a lookup aid rather than a safety check.
pub fn build_hash_map(content: &str, length_override: Option<usize>) -> HashMap<String, usize> {
    let document = Document::parse(content);
    let length = hasher::effective_hash_length(document.line_count(), length_override);

    return document
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let number = index.saturating_add(1);
            return (format!("{number}:{}", hasher::compute_line_hash(index, line, length)), number);
        })
        .collect();
}

/// Lift a reference out of a bare string or an annotated line and lowercase it.
///
/// # Errors
///
/// Returns `Error::InvalidReference` when neither form matches.
pub fn normalize_hash_ref(input: &str) -> Result<String, Error> {
    let trimmed = input.trim();

    if BARE_REF_ANY_CASE.is_match(trimmed) {
        return Ok(trimmed.to_ascii_lowercase());
    }

    return ANNOTATED_REF
        .captures(trimmed)
        .and_then(|caps| return caps.get(1))
        .map(|m| return m.as_str().to_ascii_lowercase())
        .ok_or_else(|| return Error::InvalidReference { reference: input.to_string() });
}

/// Parse a canonical `<line>:<hash>` reference.
///
/// # Errors
///
/// Returns `Error::InvalidReference` unless the input is exactly
/// `^\d+:[0-9a-f]{2,8}$` with a line number that fits in `usize`.
pub fn parse_hash_ref(input: &str) -> Result<HashRef, Error> {
    let invalid = || return Error::InvalidReference { reference: input.to_string() };

    let caps = CANONICAL_REF.captures(input).ok_or_else(invalid)?;
    let line = caps
        .get(1)
        .and_then(|m| return m.as_str().parse::<usize>().ok())
        .ok_or_else(invalid)?;
    let hash = caps.get(2).ok_or_else(invalid)?.as_str().to_string();

    return Ok(HashRef { hash, line });
}

/// Normalise then parse: the usual entry point for caller-supplied refs.
///
/// # Errors
///
/// Returns `Error::InvalidReference` for malformed input.
pub fn resolve_hash_ref(input: &str) -> Result<HashRef, Error> {
    let normalized = normalize_hash_ref(input)?;
    return parse_hash_ref(&normalized).map_err(|_err| return Error::InvalidReference {
        reference: input.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::{DEFAULT_PREFIX, annotate};

    #[test]
    fn parses_canonical() {
        let r = parse_hash_ref("12:a3f").unwrap();
        assert_eq!(r, HashRef { hash: "a3f".to_string(), line: 12 });
        assert_eq!(r.to_string(), "12:a3f");
    }

    #[test]
    fn accepts_legacy_two_char_hashes() {
        assert!(parse_hash_ref("3:0f").is_ok());
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "12", "12:", ":abc", "12:abcdefabc", "12:ABC", "x:abc", " 1:abc", "1:abc|", "1:g00"] {
            assert!(
                matches!(parse_hash_ref(bad), Err(Error::InvalidReference { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_overflowing_line_numbers() {
        assert!(parse_hash_ref("99999999999999999999999999:abc").is_err());
    }

    #[test]
    fn normalizes_bare_refs() {
        assert_eq!(normalize_hash_ref("  7:ABC ").unwrap(), "7:abc");
    }

    #[test]
    fn normalizes_annotated_lines() {
        assert_eq!(normalize_hash_ref("#HL 12:a3f|    let x = 1;").unwrap(), "12:a3f");
        assert_eq!(normalize_hash_ref("4:0B1C|no prefix").unwrap(), "4:0b1c");
        assert_eq!(normalize_hash_ref("+#HL 5:abc|added").unwrap(), "5:abc");
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(normalize_hash_ref("line two").is_err());
        assert!(normalize_hash_ref("#HL abc|x").is_err());
    }

    #[test]
    fn hash_map_matches_annotation_without_collisions() {
        let content = "alpha\nbeta\ngamma";
        let map = build_hash_map(content, None);
        assert_eq!(map.len(), 3);

        for line in annotate(content, None, Some(DEFAULT_PREFIX)).lines() {
            let key = normalize_hash_ref(line).unwrap();
            assert!(map.contains_key(&key), "missing {key}");
        }
    }

    #[test]
    fn resolve_combines_normalize_and_parse() {
        let r = resolve_hash_ref("#HL 2:ABC|body").unwrap();
        assert_eq!(r.line, 2);
        assert_eq!(r.hash, "abc");
    }
}
