//! Bounded LRU of annotated documents, keyed by a caller-chosen identity.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use twox_hash::XxHash64;

/// Entries kept when the host does not configure a capacity.
pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(64).expect("64 is non-zero");

/// Seed for content fingerprints. Fixed so fingerprints are stable within a process.
const FINGERPRINT_SEED: u64 = 0;

/// Memoizes [`crate::annotator::annotate`] output per key.
///
/// An entry only answers a lookup when the content it was built from still
/// fingerprints the same; otherwise it is dropped and the lookup misses.
/// Every operation locks the whole cache, so each is atomic per key.
pub struct AnnotationCache {
    /// Most-recently-used ordered entries.
    entries: Mutex<LruCache<String, CacheEntry>>,
}

/// What the cache remembers about one key.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Tagged form of the content.
    annotated: String,
    /// Fingerprint of the content the tags were computed from.
    fingerprint: u64,
}

impl AnnotationCache {
    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        return self.entries.lock().cap().get();
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Return the tagged text for `key` if it was built from `content`.
    /// A hit becomes most recently used; a fingerprint mismatch evicts the entry.
    pub fn get(&self, key: &str, content: &str) -> Option<String> {
        let fingerprint = fingerprint(content);
        let mut entries = self.entries.lock();

        match entries.get(key) {
            None => return None,
            Some(entry) if entry.fingerprint == fingerprint => return Some(entry.annotated.clone()),
            Some(_) => {},
        }

        tracing::debug!(key, "content changed, dropping cached annotation");
        entries.pop(key);
        return None;
    }

    /// Remove `key` if present.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().pop(key);
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        return self.entries.lock().is_empty();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        return self.entries.lock().len();
    }

    /// Create an empty cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        return Self {
            entries: Mutex::new(LruCache::new(capacity)),
        };
    }

    /// Store `annotated` for `key`, evicting the least recently used entry when full.
    pub fn set(&self, key: &str, content: &str, annotated: &str) {
        let entry = CacheEntry {
            annotated: annotated.to_string(),
            fingerprint: fingerprint(content),
        };
        if let Some((evicted, _)) = self.entries.lock().push(key.to_string(), entry)
            && evicted != key
        {
            tracing::debug!(evicted = %evicted, "annotation cache full, evicted least recently used");
        }
    }
}

impl Default for AnnotationCache {
    fn default() -> Self {
        return Self::new(DEFAULT_CAPACITY);
    }
}

/// Cheap non-cryptographic fingerprint of a whole document.
pub fn fingerprint(content: &str) -> u64 {
    return XxHash64::oneshot(FINGERPRINT_SEED, content.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> AnnotationCache {
        AnnotationCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn hit_after_set() {
        let cache = cache(4);
        cache.set("a.rs", "content", "tagged");
        assert_eq!(cache.get("a.rs", "content").as_deref(), Some("tagged"));
    }

    #[test]
    fn miss_for_unknown_key() {
        assert_eq!(cache(4).get("nope", "content"), None);
    }

    #[test]
    fn overwrite_with_new_content_misses_old_content() {
        let cache = cache(4);
        cache.set("k", "C", "A");
        cache.set("k", "C2", "A2");
        assert_eq!(cache.get("k", "C"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn mismatch_evicts() {
        let cache = cache(4);
        cache.set("k", "C", "A");
        assert_eq!(cache.get("k", "changed"), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get("k", "C"), None);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = cache(2);
        cache.set("a", "1", "A");
        cache.set("b", "2", "B");
        // Touch "a" so "b" becomes the oldest.
        assert!(cache.get("a", "1").is_some());
        cache.set("c", "3", "C");

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b", "2").is_none());
        assert!(cache.get("a", "1").is_some());
        assert!(cache.get("c", "3").is_some());
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = cache(4);
        cache.set("a", "1", "A");
        cache.set("b", "2", "B");
        cache.invalidate("a");
        assert!(cache.get("a", "1").is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 4);
    }

    #[test]
    fn fingerprint_is_content_sensitive() {
        assert_eq!(fingerprint("abc"), fingerprint("abc"));
        assert_ne!(fingerprint("abc"), fingerprint("abd"));
    }
}
