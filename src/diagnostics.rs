use hashline::{EditKind, Endpoint, Error};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened, why, and how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::StaleReference { actual, endpoint, expected, line } => {
            render_stale_reference(*endpoint, *line, expected, actual)
        },
        Error::OutOfRange { endpoint, line, line_count } => render_out_of_range(*endpoint, *line, *line_count),
        Error::InvalidReference { reference } => render_invalid_reference(reference),
        Error::InvalidRange { start, end } => render_invalid_range(*start, *end),
        Error::MissingReplacement { operation } => render_missing_replacement(*operation),
        Error::FileTooLarge { file, size_bytes, max_bytes } => render_file_too_large(file, *size_bytes, *max_bytes),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),

        Error::InvalidConfig { key, reason } => format!("\
# Error: Invalid Config

`{key}` {reason}.

## Fix

Correct `{key}` in `.hashline.toml`.
"),

        Error::InvalidGlob { pattern, reason } => format!("\
# Error: Invalid Exclude Pattern

`{pattern}`: {reason}

## Fix

Correct the `exclude` list in `.hashline.toml`.
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: Invalid JSON

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Check `.hashline.toml`. Known keys: `prefix`, `hash_length`, `exclude`,
`cache_capacity`, `max_file_bytes`.
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_file_too_large(file: &std::path::Path, size_bytes: u64, max_bytes: u64) -> String {
    format!("\
# Error: File Too Large

`{}` is {size_bytes} bytes (max {max_bytes}).

## Fix

Raise `max_file_bytes` in `.hashline.toml`, or edit the file in smaller pieces.
", file.display())
}

fn render_invalid_range(start: usize, end: usize) -> String {
    format!("\
# Error: Invalid Range

The start reference (line {start}) comes after the end reference (line {end}).

## Fix

Swap the references so the range runs top to bottom.
")
}

fn render_invalid_reference(reference: &str) -> String {
    format!("\
# Error: Invalid Reference

`{reference}` is not a line reference.

## Expected

A bare reference such as `12:a3f`, or a whole annotated line such as

    #HL 12:a3f|    let total = 0;

Get fresh references with:

    hashline annotate <file>
")
}

fn render_missing_replacement(operation: EditKind) -> String {
    format!("\
# Error: Missing Replacement

`{operation}` needs the text to write.

## Fix

Pass `--text <TEXT>` or `--text-file <FILE>`.
")
}

fn render_out_of_range(endpoint: Endpoint, line: usize, line_count: usize) -> String {
    format!("\
# Error: Line Out Of Range

The {endpoint} names line {line}, but the document has {line_count} lines.

## Fix

The file probably shrank. Re-read it to get current references:

    hashline annotate <file>
")
}

fn render_stale_reference(endpoint: Endpoint, line: usize, expected: &str, actual: &str) -> String {
    format!("\
# Error: Stale Reference

The {endpoint} `{line}:{expected}` no longer matches: line {line} now hashes to `{actual}`.
The line changed after it was read. Nothing was edited.

## Fix

Re-read the file and retry with the new reference:

    hashline annotate <file>
")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_mentions_both_hashes_and_recovery() {
        let md = render_error(&Error::StaleReference {
            actual: "0f1".to_string(),
            endpoint: Endpoint::Start,
            expected: "abc".to_string(),
            line: 4,
        });
        assert!(md.starts_with("# Error: Stale Reference"));
        assert!(md.contains("`4:abc`"));
        assert!(md.contains("`0f1`"));
        assert!(md.contains("hashline annotate"));
    }

    #[test]
    fn generic_fallback_uses_display() {
        let md = render_error(&Error::FileNotFound { path: "gone.txt".into() });
        assert!(md.contains("`gone.txt` does not exist."));
    }
}
