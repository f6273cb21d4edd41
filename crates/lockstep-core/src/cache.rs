//! Bounded dependent-document cache
//!
//! Re-reading every dependent document on every pass is wasteful when most
//! of them have not changed on disk. The cache keys parsed documents by
//! handle and trusts a cached copy only while the storage collaborator
//! reports the same last-modified timestamp, so external edits are observed
//! on the next fetch. Capacity is bounded with least-recently-used
//! eviction; each engine owns its cache, nothing is shared process-wide.

use std::num::NonZeroUsize;
use std::time::SystemTime;

use lockstep_fs::{DocumentStore, Handle};
use lru::LruCache;
use serde_json::Value;

/// Cache configuration options
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of documents kept in memory
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 16 }
    }
}

#[derive(Debug, Clone)]
struct CachedDocument {
    value: Value,
    modified: SystemTime,
}

/// LRU cache of parsed documents keyed by handle.
pub struct DocumentCache {
    entries: LruCache<Handle, CachedDocument>,
}

impl DocumentCache {
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Load the document at `handle` through the cache.
    ///
    /// The cached copy is returned only while `store` reports the same
    /// last-modified timestamp it was cached under; otherwise the document
    /// is re-read and the entry refreshed. Storage errors propagate and
    /// leave any cached entry untouched.
    pub fn fetch(&mut self, store: &dyn DocumentStore, handle: &Handle) -> lockstep_fs::Result<Value> {
        let modified = store.modified(handle)?;
        if let Some(cached) = self.entries.get(handle)
            && cached.modified == modified
        {
            tracing::debug!("Cache hit for {}", handle);
            return Ok(cached.value.clone());
        }
        tracing::debug!("Cache miss for {}", handle);
        let value = store.read(handle)?;
        self.entries.put(
            handle.clone(),
            CachedDocument {
                value: value.clone(),
                modified,
            },
        );
        Ok(value)
    }

    /// Record a just-written document so the next fetch skips the re-read.
    pub fn put(&mut self, handle: Handle, value: Value, modified: SystemTime) {
        self.entries.put(handle, CachedDocument { value, modified });
    }

    /// Drop the cached entry for `handle`.
    pub fn invalidate(&mut self, handle: &Handle) {
        self.entries.pop(handle);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
