//! Core CLI commands for hashline: annotate, strip, map, verify, range, edit.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use hashline::{EditKind, Error, HashEdit, Verification};

use crate::config::Config;

/// Arguments for the `edit` command, gathered by `main`.
pub struct EditArgs {
    /// Print the edited document instead of writing it back.
    pub dry_run: bool,
    /// Optional end reference for replace/delete.
    pub end: Option<String>,
    /// Emit the edit result as JSON on stdout.
    pub json: bool,
    /// Which edit to apply.
    pub operation: EditKind,
    /// Start (or anchor) reference.
    pub start: String,
    /// Replacement text given inline.
    pub text: Option<String>,
    /// Replacement text read from a file.
    pub text_file: Option<PathBuf>,
}

/// Print the annotated document. Excluded paths are printed unchanged.
///
/// # Errors
///
/// Returns errors from config loading, file reading, or the size check.
pub fn annotate(file: &str, config: &Config) -> Result<(), Error> {
    let path = PathBuf::from(file);
    let content = read_document(&path)?;

    if config.filter()?.should_exclude(file) {
        tracing::info!(file, "path excluded, printing without tags");
        print!("{content}");
        return Ok(());
    }

    config.check_size(&path, &content)?;
    println!("{}", hashline::annotate(&content, config.hash_length, config.prefix()));
    return Ok(());
}

/// Apply a hash-verified edit and write the file back.
///
/// Tags pasted into the replacement text are stripped first, so annotated
/// lines copied from `annotate` output can be used as-is.
///
/// # Errors
///
/// Returns errors from reading, verification, or writing. On any
/// verification error the file is left untouched.
pub fn edit(file: &str, args: EditArgs, config: &Config) -> Result<(), Error> {
    let path = PathBuf::from(file);
    let content = read_document(&path)?;

    let replacement = match (args.text, args.text_file) {
        (Some(text), _) => Some(text),
        (None, Some(text_file)) => Some(read_document(&text_file)?),
        (None, None) => None,
    };

    let request = HashEdit {
        end_ref: args.end,
        operation: args.operation,
        replacement: replacement.map(|r| return hashline::strip(&r, config.prefix())),
        start_ref: args.start,
    };

    let result = hashline::apply_hash_edit(&request, &content, None)?;

    if args.dry_run {
        println!("{}", result.content);
    } else {
        std::fs::write(&path, &result.content)?;
    }

    if args.json {
        println!("{}", serde_json::to_string(&result)?);
    }

    eprintln!(
        "{} {file} lines {}-{}{}",
        result.operation,
        result.start_line,
        result.end_line,
        if args.dry_run { " (dry run)" } else { "" },
    );
    return Ok(());
}

/// Print every line's reference, in line order.
///
/// # Errors
///
/// Returns errors from file reading.
pub fn map(file: &str, config: &Config) -> Result<(), Error> {
    let content = read_document(Path::new(file))?;
    let mut entries: Vec<(String, usize)> = hashline::build_hash_map(&content, config.hash_length).into_iter().collect();
    entries.sort_by_key(|(_, line)| return *line);

    for (reference, line) in entries {
        println!("{reference} -> {line}");
    }
    return Ok(());
}

/// Print the text of a verified range.
///
/// # Errors
///
/// Returns reference, range, or verification errors.
pub fn range(file: &str, start: &str, end: &str) -> Result<(), Error> {
    let content = read_document(Path::new(file))?;
    let start = hashline::normalize_hash_ref(start)?;
    let end = hashline::normalize_hash_ref(end)?;

    let resolved = hashline::resolve_range(&start, &end, &content, None)?;
    println!("{}", resolved.text);
    return Ok(());
}

/// Read a document, mapping a missing file to `Error::FileNotFound`.
///
/// # Errors
///
/// Returns `Error::FileNotFound` or `Error::Io`.
pub fn read_document(path: &Path) -> Result<String, Error> {
    return match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(Error::Io(e)),
        Ok(content) => Ok(content),
    };
}

/// Print the document with tags removed.
///
/// # Errors
///
/// Returns errors from file reading.
pub fn strip(file: &str, config: &Config) -> Result<(), Error> {
    let content = read_document(Path::new(file))?;
    print!("{}", hashline::strip(&content, config.prefix()));
    return Ok(());
}

/// Check one reference. Exit code: fresh (0), stale (1), out of range (2).
///
/// # Errors
///
/// Returns errors from file reading or reference parsing.
pub fn verify(file: &str, reference: &str) -> Result<ExitCode, Error> {
    let content = read_document(Path::new(file))?;
    let reference = hashline::reference::resolve_hash_ref(reference)?;

    let outcome = hashline::verify_hash(reference.line, &reference.hash, &content, None, None);
    return match outcome {
        Verification::Fresh => {
            println!("FRESH   {file}:{reference}");
            Ok(ExitCode::SUCCESS)
        },
        Verification::OutOfRange { line_count } => {
            println!("RANGE   {file}:{reference} (document has {line_count} lines)");
            Ok(ExitCode::from(2))
        },
        Verification::Stale { actual, .. } => {
            println!("STALE   {file}:{reference} (now {}:{actual})", reference.line);
            eprintln!();
            eprintln!("hint: run `hashline annotate {file}` to get current references");
            Ok(ExitCode::from(1))
        },
    };
}
