//! Line-delimited JSON loop: one request per stdin line, one response per stdout line.
//!
//! This is the host side of the library: it owns the annotation cache and the
//! exclude filter, reads and writes files, and keeps running after a request
//! fails.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use hashline::{AnnotationCache, Error, HashEdit, PathFilter, Verification};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::commands::read_document;
use crate::config::Config;

/// A single request, tagged by `op`.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    /// Drop every cached annotation.
    Clear,
    /// Apply an edit and write the file back.
    Edit {
        /// The edit, with camelCase fields.
        edit: HashEdit,
        /// File to edit.
        path: String,
    },
    /// Drop the cached annotation for one path.
    Invalidate {
        /// Cache key to drop.
        path: String,
    },
    /// Read a file, annotated unless excluded.
    Read {
        /// File to read.
        path: String,
    },
    /// Remove tags from every string inside an arbitrary JSON value.
    Strip {
        /// Value to strip; returned as a new value.
        value: Value,
    },
    /// Check a single reference.
    Verify {
        /// File to check against.
        path: String,
        /// Bare or annotated reference.
        #[serde(rename = "ref")]
        reference: String,
    },
}

/// State shared by every request in one `serve` run.
pub struct Session {
    /// Annotations keyed by path.
    cache: AnnotationCache,
    /// Loaded configuration.
    config: Config,
    /// Compiled exclude patterns.
    filter: PathFilter,
    /// Directory request paths are relative to.
    root: PathBuf,
}

impl Session {
    /// Apply an edit request.
    ///
    /// # Errors
    ///
    /// Returns read, verification, or write errors.
    fn edit(&self, path: &str, mut edit: HashEdit) -> Result<Value, Error> {
        let full = self.root.join(path);
        let content = read_document(&full)?;

        edit.replacement = edit.replacement.map(|r| return hashline::strip(&r, self.config.prefix()));
        let result = hashline::apply_hash_edit(&edit, &content, None)?;

        std::fs::write(&full, &result.content)?;
        self.cache.invalidate(path);

        return Ok(json!({
            "ok": true,
            "operation": result.operation,
            "startLine": result.start_line,
            "endLine": result.end_line,
        }));
    }

    /// Route one request.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler for the request returns.
    fn handle(&self, request: Request) -> Result<Value, Error> {
        return match request {
            Request::Clear => {
                self.cache.clear();
                Ok(json!({ "ok": true }))
            },
            Request::Edit { edit, path } => self.edit(&path, edit),
            Request::Invalidate { path } => {
                self.cache.invalidate(&path);
                Ok(json!({ "ok": true }))
            },
            Request::Read { path } => self.read(&path),
            Request::Strip { value } => Ok(json!({
                "ok": true,
                "value": hashline::strip_value(&value, self.config.prefix()),
            })),
            Request::Verify { path, reference } => self.verify(&path, &reference),
        };
    }

    /// Build a session from config.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidGlob` if an exclude pattern is malformed.
    pub fn new(root: PathBuf, config: Config) -> Result<Self, Error> {
        let filter = config.filter()?;
        return Ok(Self {
            cache: AnnotationCache::new(config.cache_capacity),
            config,
            filter,
            root,
        });
    }

    /// Read a file, serving the annotation from cache when the content is unchanged.
    ///
    /// # Errors
    ///
    /// Returns read errors or `Error::FileTooLarge`.
    fn read(&self, path: &str) -> Result<Value, Error> {
        let full = self.root.join(path);
        let content = read_document(&full)?;

        if self.filter.should_exclude(path) {
            return Ok(json!({
                "ok": true,
                "annotated": false,
                "content": content,
                "excludedBy": self.filter.matching_patterns(path),
            }));
        }

        self.config.check_size(&full, &content)?;

        let annotated = match self.cache.get(path, &content) {
            Some(hit) => hit,
            None => {
                let fresh = hashline::annotate(&content, self.config.hash_length, self.config.prefix());
                self.cache.set(path, &content, &fresh);
                fresh
            },
        };

        return Ok(json!({ "ok": true, "annotated": true, "content": annotated }));
    }

    /// Process requests until `input` is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading input or writing output fails. Request
    /// errors are reported in the response and do not stop the loop.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<(), Error> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = serde_json::from_str::<Request>(&line)
                .map_err(Error::from)
                .and_then(|request| return self.handle(request))
                .unwrap_or_else(|e| return error_response(&e));

            writeln!(output, "{response}")?;
            output.flush()?;
        }
        return Ok(());
    }

    /// Check a reference against the file on disk.
    ///
    /// # Errors
    ///
    /// Returns read or reference parsing errors.
    fn verify(&self, path: &str, reference: &str) -> Result<Value, Error> {
        let content = read_document(&self.root.join(path))?;
        let reference = hashline::reference::resolve_hash_ref(reference)?;
        let outcome = hashline::verify_hash(reference.line, &reference.hash, &content, None, None);

        return Ok(match outcome {
            Verification::Fresh => json!({ "ok": true, "valid": true }),
            Verification::OutOfRange { line_count } => json!({
                "ok": true,
                "valid": false,
                "reason": "out_of_range",
                "lineCount": line_count,
            }),
            Verification::Stale { actual, expected } => json!({
                "ok": true,
                "valid": false,
                "reason": "stale_reference",
                "expected": expected,
                "actual": actual,
            }),
        });
    }
}

/// Short machine-readable name for an error.
const fn error_kind(e: &Error) -> &'static str {
    return match e {
        Error::FileNotFound { .. } => "file_not_found",
        Error::FileTooLarge { .. } => "file_too_large",
        Error::InvalidConfig { .. } => "invalid_config",
        Error::InvalidGlob { .. } => "invalid_glob",
        Error::InvalidRange { .. } => "invalid_range",
        Error::InvalidReference { .. } => "invalid_reference",
        Error::Io(_) => "io",
        Error::Json(_) => "invalid_request",
        Error::MissingReplacement { .. } => "missing_replacement",
        Error::OutOfRange { .. } => "out_of_range",
        Error::StaleReference { .. } => "stale_reference",
        Error::TomlDe(_) => "invalid_config",
    };
}

/// Failure response for a request.
fn error_response(e: &Error) -> Value {
    tracing::debug!(error = %e, "request failed");
    return json!({ "ok": false, "kind": error_kind(e), "error": e.to_string() });
}
