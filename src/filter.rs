//! Exclude-glob filtering of document paths.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::Error;

/// A compiled set of exclude patterns.
///
/// `*` and `?` stay within one path segment, `**` crosses segments, and
/// brace sets and bracket classes are supported.
#[derive(Debug, Clone)]
pub struct PathFilter {
    /// The original pattern text, for diagnostics.
    patterns: Vec<String>,
    /// Compiled matcher for all patterns.
    set: GlobSet,
}

impl PathFilter {
    /// A filter that excludes nothing.
    pub fn empty() -> Self {
        return Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        };
    }

    /// Compile exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidGlob` for the first pattern that does not compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| return Error::InvalidGlob {
                    pattern: pattern.to_string(),
                    reason: e.kind().to_string(),
                })?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|e| return Error::InvalidGlob {
            pattern: patterns.iter().map(|p| return p.as_ref()).collect::<Vec<_>>().join(", "),
            reason: e.to_string(),
        })?;

        return Ok(Self {
            patterns: patterns.iter().map(|p| return p.as_ref().to_string()).collect(),
            set,
        });
    }

    /// The patterns that match `path`, in the order they were configured.
    pub fn matching_patterns(&self, path: &str) -> Vec<&str> {
        return self
            .set
            .matches(normalize_path(path))
            .into_iter()
            .filter_map(|index| return self.patterns.get(index).map(String::as_str))
            .collect();
    }

    /// Whether `path` matches any exclude pattern.
    pub fn should_exclude(&self, path: &str) -> bool {
        if self.set.is_empty() {
            return false;
        }
        return self.set.is_match(normalize_path(path));
    }
}

/// Use `/` separators and drop a leading `./`.
pub fn normalize_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let mut trimmed = forward.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    return trimmed.to_string();
}

/// One-shot form of [`PathFilter::should_exclude`]. Patterns that fail to
/// compile are skipped with a warning rather than excluding everything.
pub fn should_exclude<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    let valid: Vec<&str> = patterns
        .iter()
        .map(|p| return p.as_ref())
        .filter(|p| {
            let ok = GlobBuilder::new(p).literal_separator(true).build().is_ok();
            if !ok {
                tracing::warn!(pattern = %p, "skipping invalid exclude glob");
            }
            return ok;
        })
        .collect();

    return PathFilter::new(&valid).is_ok_and(|filter| return filter.should_exclude(path));
}
