use std::num::NonZeroUsize;
use std::path::Path;

use hashline::cache::DEFAULT_CAPACITY;
use hashline::hasher::{MAX_HASH_LENGTH, MIN_GENERATED_HASH_LENGTH};
use hashline::{DEFAULT_PREFIX, Error, PathFilter};

/// Config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".hashline.toml";

/// Largest document annotated when the config does not say otherwise (1 MiB).
const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Project configuration loaded from `.hashline.toml`.
pub struct Config {
    /// Annotation cache entries for `serve`.
    pub cache_capacity: NonZeroUsize,
    /// Exclude globs; matching paths are never annotated.
    pub exclude: Vec<String>,
    /// Fixed hash length. Values below 3 fall back to the adaptive length.
    pub hash_length: Option<usize>,
    /// Size limit in UTF-8 bytes for annotation.
    pub max_file_bytes: u64,
    /// Tag prefix, or `None` for bare tags.
    pub prefix: Option<String>,
}

/// `prefix = false`, `prefix = true` or `prefix = "..."`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum PrefixSetting {
    /// `false` disables the prefix, `true` keeps the default.
    Enabled(bool),
    /// A custom prefix.
    Text(String),
}

/// Raw TOML structure for `.hashline.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct HashlineTomlConfig {
    /// `cache_capacity = 64`
    #[serde(default)]
    cache_capacity: Option<NonZeroUsize>,
    /// `exclude = ["**/*.lock"]`
    #[serde(default)]
    exclude: Vec<String>,
    /// `hash_length = 4`
    #[serde(default)]
    hash_length: Option<usize>,
    /// `max_file_bytes = 1048576`
    #[serde(default)]
    max_file_bytes: Option<u64>,
    /// `prefix = "#HL "` or `prefix = false`
    #[serde(default)]
    prefix: Option<PrefixSetting>,
}

impl Config {
    /// Apply command-line overrides on top of the file.
    pub fn apply_overrides(&mut self, length: Option<usize>, no_prefix: bool) {
        if length.is_some() {
            self.hash_length = length;
        }
        if no_prefix {
            self.prefix = None;
        }
    }

    /// Refuse content larger than `max_file_bytes`.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileTooLarge` when the limit is exceeded.
    pub fn check_size(&self, path: &Path, content: &str) -> Result<(), Error> {
        let size_bytes: u64 = content.len().try_into().unwrap_or(u64::MAX);
        if size_bytes > self.max_file_bytes {
            return Err(Error::FileTooLarge {
                file: path.to_path_buf(),
                max_bytes: self.max_file_bytes,
                size_bytes,
            });
        }
        return Ok(());
    }

    /// Default config: default prefix, adaptive length, nothing excluded.
    pub fn defaults() -> Self {
        return Self {
            cache_capacity: DEFAULT_CAPACITY,
            exclude: Vec::new(),
            hash_length: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            prefix: Some(DEFAULT_PREFIX.to_string()),
        };
    }

    /// Compile the exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidGlob` for a malformed pattern.
    pub fn filter(&self) -> Result<PathFilter, Error> {
        return PathFilter::new(&self.exclude);
    }

    /// Load config from `.hashline.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist, and an error if it exists
    /// but is malformed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::defaults()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse config text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys,
    /// or `Error::InvalidConfig` if `hash_length` is outside 3-8.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: HashlineTomlConfig = toml::from_str(content)?;
        let defaults = Self::defaults();

        if let Some(length) = raw.hash_length
            && !(MIN_GENERATED_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&length)
        {
            return Err(Error::InvalidConfig {
                key: "hash_length".to_string(),
                reason: format!("must be between {MIN_GENERATED_HASH_LENGTH} and {MAX_HASH_LENGTH}, got {length}"),
            });
        }

        let prefix = match raw.prefix {
            None | Some(PrefixSetting::Enabled(true)) => defaults.prefix,
            Some(PrefixSetting::Enabled(false)) => None,
            Some(PrefixSetting::Text(text)) => Some(text),
        };

        return Ok(Self {
            cache_capacity: raw.cache_capacity.unwrap_or(defaults.cache_capacity),
            exclude: raw.exclude,
            hash_length: raw.hash_length,
            max_file_bytes: raw.max_file_bytes.unwrap_or(defaults.max_file_bytes),
            prefix,
        });
    }

    /// The prefix as a borrowed option, the form the annotator takes.
    pub fn prefix(&self) -> Option<&str> {
        return self.prefix.as_deref();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.prefix(), Some(DEFAULT_PREFIX));
        assert_eq!(config.hash_length, None);
        assert!(config.exclude.is_empty());
        assert_eq!(config.cache_capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn prefix_can_be_disabled_or_replaced() {
        assert_eq!(Config::parse("prefix = false").unwrap().prefix(), None);
        assert_eq!(Config::parse("prefix = true").unwrap().prefix(), Some(DEFAULT_PREFIX));
        assert_eq!(Config::parse("prefix = \">> \"").unwrap().prefix(), Some(">> "));
    }

    #[test]
    fn full_file() {
        let config = Config::parse(
            "hash_length = 5\nexclude = [\"**/*.lock\"]\ncache_capacity = 8\nmax_file_bytes = 10\n",
        )
        .unwrap();
        assert_eq!(config.hash_length, Some(5));
        assert_eq!(config.cache_capacity.get(), 8);
        assert!(config.filter().unwrap().should_exclude("a/Cargo.lock"));
        assert!(config.check_size(Path::new("f"), "01234567890").is_err());
        assert!(config.check_size(Path::new("f"), "0123456789").is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(Config::parse("prefx = false"), Err(Error::TomlDe(_))));
    }

    #[test]
    fn hash_length_outside_generated_range_is_rejected() {
        for bad in ["hash_length = 1", "hash_length = 2", "hash_length = 9", "hash_length = 20"] {
            let err = Config::parse(bad).err().unwrap();
            assert!(
                matches!(&err, Error::InvalidConfig { key, .. } if key == "hash_length"),
                "{bad}: {err}"
            );
        }
        assert_eq!(Config::parse("hash_length = 3").unwrap().hash_length, Some(3));
        assert_eq!(Config::parse("hash_length = 8").unwrap().hash_length, Some(8));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(Config::parse("cache_capacity = 0").is_err());
    }

    #[test]
    fn overrides_win() {
        let mut config = Config::defaults();
        config.apply_overrides(Some(6), true);
        assert_eq!(config.hash_length, Some(6));
        assert_eq!(config.prefix(), None);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.prefix(), Some(DEFAULT_PREFIX));
    }
}
