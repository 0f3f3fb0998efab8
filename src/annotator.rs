//! Tagging documents line by line and stripping the tags back off.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::hasher::{self, MAX_HASH_LENGTH};

/// Prefix written before each tag unless the caller disables it.
pub const DEFAULT_PREFIX: &str = "#HL ";

/// Tag pattern for [`DEFAULT_PREFIX`], the prefix nearly every caller uses.
static DEFAULT_TAG: LazyLock<Regex> = LazyLock::new(|| return compile_tag_pattern(DEFAULT_PREFIX));

/// A document split into lines, remembering how to put it back together.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    /// Line terminator detected once for the whole document.
    pub ending: LineEnding,
    /// Lines without their terminators. Always at least one entry.
    pub lines: Vec<&'a str>,
}

impl<'a> Document<'a> {
    /// Rejoin lines with this document's terminator.
    pub fn join<S: AsRef<str>>(&self, lines: &[S]) -> String {
        return join_lines(lines, self.ending.as_str());
    }

    /// Number of lines, counting a trailing empty line after a final newline.
    pub fn line_count(&self) -> usize {
        return self.lines.len();
    }

    /// Detect the line ending and split.
    ///
    /// A document is CRLF only when every `\n` is preceded by `\r`. Mixed
    /// documents are treated as LF and each stray `\r` stays in its line,
    /// which keeps `strip(annotate(text)) == text` for every input.
    pub fn parse(content: &'a str) -> Self {
        let ending = LineEnding::detect(content);
        let lines = match ending {
            LineEnding::Crlf => content.split("\r\n").collect(),
            LineEnding::Lf => content.split('\n').collect(),
        };
        return Self { ending, lines };
    }
}

/// Line terminator style of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\r\n` throughout.
    Crlf,
    /// `\n`, or a mix that cannot be normalised losslessly.
    Lf,
}

impl LineEnding {
    /// The terminator text.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
        };
    }

    /// Inspect `content` once.
    pub fn detect(content: &str) -> Self {
        let crlf = content.matches("\r\n").count();
        if crlf > 0 && crlf == content.matches('\n').count() {
            return Self::Crlf;
        }
        return Self::Lf;
    }
}

/// Tag every line of `content` as `<prefix><n>:<hash>|<line>`.
///
/// The hash length is `length_override` when it is at least 3 (capped at 8),
/// otherwise chosen from the line count. When a line's hash repeats one
/// already used in this document, only that line is re-hashed one char wider.
/// `prefix` of `None` writes bare tags.
pub fn annotate(content: &str, length_override: Option<usize>, prefix: Option<&str>) -> String {
    let document = Document::parse(content);
    let length = hasher::effective_hash_length(document.line_count(), length_override);
    let widened = length.saturating_add(1).min(MAX_HASH_LENGTH);
    let prefix = prefix.unwrap_or("");

    let mut used: HashSet<String> = HashSet::with_capacity(document.line_count());
    let mut tagged: Vec<String> = Vec::with_capacity(document.line_count());

    for (index, line) in document.lines.iter().enumerate() {
        let mut hash = hasher::compute_line_hash(index, line, length);
        if used.contains(&hash) {
            let wider = hasher::compute_line_hash(index, line, widened);
            tracing::debug!(line = index.saturating_add(1), from = %hash, to = %wider, "widened colliding hash");
            hash = wider;
        }
        used.insert(hash.clone());

        let mut out = String::with_capacity(prefix.len().saturating_add(line.len()).saturating_add(16));
        let _ = write!(out, "{prefix}{}:{hash}|{line}", index.saturating_add(1));
        tagged.push(out);
    }

    return document.join(&tagged);
}

/// Compile the leading-tag pattern for `prefix`.
///
/// # Panics
///
/// Panics if the pattern fails to compile, which cannot happen for an
/// escaped prefix.
fn compile_tag_pattern(prefix: &str) -> Regex {
    let source = format!(r"^([+\- ])?{}\d+:[0-9a-f]{{2,8}}\|", regex::escape(prefix));
    return Regex::new(&source).expect("escaped prefix always forms a valid regex");
}

/// Join lines with a separator.
fn join_lines<S: AsRef<str>>(lines: &[S], separator: &str) -> String {
    let total: usize = lines.iter().map(|l| return l.as_ref().len().saturating_add(separator.len())).sum();
    let mut out = String::with_capacity(total);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(line.as_ref());
    }
    return out;
}

/// Remove tags produced by [`annotate`] with the same `prefix`.
///
/// A line may carry one leading unified-diff marker (`+`, `-` or space)
/// before its tag; the marker is kept and the tag dropped. Lines that do
/// not start with a tag pass through untouched.
///
/// # Panics
///
/// Panics if the tag pattern fails to compile, which cannot happen for an
/// escaped prefix.
pub fn strip(annotated: &str, prefix: Option<&str>) -> String {
    return strip_text(&tag_pattern(prefix), annotated);
}

/// Strip one line against a compiled tag pattern.
fn strip_line(pattern: &Regex, line: &str) -> String {
    let Some(caps) = pattern.captures(line) else {
        return line.to_string();
    };
    let Some(whole) = caps.get(0) else {
        return line.to_string();
    };
    let marker = caps.get(1).map_or("", |m| return m.as_str());
    let rest = line.get(whole.end()..).unwrap_or("");
    return format!("{marker}{rest}");
}

/// Strip every line of `annotated` against a compiled pattern.
fn strip_text(pattern: &Regex, annotated: &str) -> String {
    let stripped: Vec<String> = annotated
        .split('\n')
        .map(|line| return strip_line(pattern, line))
        .collect();
    return join_lines(&stripped, "\n");
}

/// Strip tags from every string inside a JSON value, returning a new value.
///
/// # Panics
///
/// Same as [`strip`].
pub fn strip_value(value: &serde_json::Value, prefix: Option<&str>) -> serde_json::Value {
    return strip_value_with(&tag_pattern(prefix), value);
}

/// Walk a JSON value, stripping each string with one compiled pattern.
fn strip_value_with(pattern: &Regex, value: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    return match value {
        Value::String(s) => Value::String(strip_text(pattern, s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| return strip_value_with(pattern, v)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| return (k.clone(), strip_value_with(pattern, v)))
                .collect(),
        ),
        other @ (Value::Null | Value::Bool(_) | Value::Number(_)) => other.clone(),
    };
}

/// Leading-tag pattern for `prefix`; the default prefix reuses [`DEFAULT_TAG`].
fn tag_pattern(prefix: Option<&str>) -> Regex {
    let prefix = prefix.unwrap_or("");
    if prefix == DEFAULT_PREFIX {
        return DEFAULT_TAG.clone();
    }
    return compile_tag_pattern(prefix);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::compute_line_hash;

    /// Find a line that collides with `0:"a"` when placed at index 1.
    fn colliding_second_line() -> String {
        let target = compute_line_hash(0, "a", 3);
        (0..200_000)
            .map(|n| format!("b{n}"))
            .find(|candidate| compute_line_hash(1, candidate, 3) == target)
            .unwrap()
    }

    #[test]
    fn annotates_with_prefix_and_one_based_numbers() {
        let out = annotate("alpha\nbeta", None, Some(DEFAULT_PREFIX));
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines[0], format!("#HL 1:{}|alpha", compute_line_hash(0, "alpha", 3)));
        assert_eq!(lines[1], format!("#HL 2:{}|beta", compute_line_hash(1, "beta", 3)));
    }

    #[test]
    fn annotates_without_prefix() {
        let out = annotate("alpha", None, None);
        assert_eq!(out, format!("1:{}|alpha", compute_line_hash(0, "alpha", 3)));
    }

    #[test]
    fn length_override_applies() {
        let out = annotate("alpha", Some(6), None);
        assert_eq!(out, format!("1:{}|alpha", compute_line_hash(0, "alpha", 6)));
    }

    #[test]
    fn preserves_crlf() {
        let text = "one\r\ntwo\r\n";
        let out = annotate(text, None, Some(DEFAULT_PREFIX));
        assert_eq!(out.matches("\r\n").count(), 2);
        assert_eq!(strip(&out, Some(DEFAULT_PREFIX)), text);
    }

    #[test]
    fn round_trips_mixed_endings() {
        let text = "one\r\ntwo\nthree\r";
        assert_eq!(LineEnding::detect(text), LineEnding::Lf);
        let out = annotate(text, None, Some(DEFAULT_PREFIX));
        assert_eq!(strip(&out, Some(DEFAULT_PREFIX)), text);
    }

    #[test]
    fn round_trips_edge_documents() {
        for text in ["", "\n", "\r\n", "a\n", "  indented\n\n\ttab", "1:abc|looks tagged"] {
            for prefix in [Some(DEFAULT_PREFIX), None, Some("[+]")] {
                let out = annotate(text, Some(4), prefix);
                assert_eq!(strip(&out, prefix), text, "text {text:?} prefix {prefix:?}");
            }
        }
    }

    #[test]
    fn strip_keeps_patch_markers() {
        let stripped = strip("+#HL 3:abc|added\n-#HL 4:0f1|removed\n #HL 5:99|context", Some(DEFAULT_PREFIX));
        assert_eq!(stripped, "+added\n-removed\n context");
    }

    #[test]
    fn strip_leaves_untagged_lines() {
        assert_eq!(strip("plain\n#HL nope|x", Some(DEFAULT_PREFIX)), "plain\n#HL nope|x");
    }

    #[test]
    fn strip_removes_only_the_leading_tag() {
        assert_eq!(strip("1:abc|2:def|x", None), "2:def|x");
    }

    #[test]
    fn collision_widens_only_the_colliding_line() {
        let second = colliding_second_line();
        let text = format!("a\n{second}");
        let out = annotate(&text, None, None);
        let lines: Vec<&str> = out.split('\n').collect();

        assert_eq!(lines[0], format!("1:{}|a", compute_line_hash(0, "a", 3)));
        assert_eq!(lines[1], format!("2:{}|{second}", compute_line_hash(1, &second, 4)));
        assert_eq!(strip(&out, None), text);
    }

    #[test]
    fn strip_value_is_pure() {
        let input = serde_json::json!({
            "text": "#HL 1:abc|hello",
            "nested": ["#HL 2:def|world", 3, null],
        });
        let out = strip_value(&input, Some(DEFAULT_PREFIX));
        assert_eq!(out, serde_json::json!({"text": "hello", "nested": ["world", 3, null]}));
        assert_eq!(input["text"], "#HL 1:abc|hello");
    }

    #[test]
    fn default_prefix_reuses_shared_pattern() {
        assert_eq!(tag_pattern(Some(DEFAULT_PREFIX)).as_str(), DEFAULT_TAG.as_str());
        assert_ne!(tag_pattern(Some("> ")).as_str(), DEFAULT_TAG.as_str());
        assert_ne!(tag_pattern(None).as_str(), DEFAULT_TAG.as_str());
    }

    #[test]
    fn strip_value_uses_one_pattern_for_every_string() {
        let input = serde_json::json!({
            "a": "> 1:abc|one",
            "b": {"c": ["> 2:def|two", "#HL 3:0ff|kept"]},
        });
        let out = strip_value(&input, Some("> "));
        assert_eq!(out, serde_json::json!({"a": "one", "b": {"c": ["two", "#HL 3:0ff|kept"]}}));
    }
}
