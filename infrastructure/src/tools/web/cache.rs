//! Chunk cache — per-URL retention of split documents.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use tracing::debug;

use toolbelt_domain::ContentChunk;

/// Bound on retained URLs; past it the oldest entry is evicted.
const MAX_ENTRIES: usize = 32;

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, Arc<Vec<ContentChunk>>>,
    order: VecDeque<String>,
}

/// Keyed cache of segmented document content.
///
/// Entries are immutable once set: [`insert`](Self::insert) for an
/// already-cached URL returns the retained sequence and discards the
/// candidate, so two racing fetches of one URL converge on a single
/// chunking — first writer wins, and no reader ever observes a partial
/// sequence.
pub struct ChunkCache {
    inner: RwLock<CacheInner>,
    max_entries: usize,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
            max_entries,
        }
    }

    /// Chunk sequence previously stored for `url`, if any.
    pub fn get(&self, url: &str) -> Option<Arc<Vec<ContentChunk>>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.entries.get(url).cloned()
    }

    /// Store `chunks` for `url` unless an entry already exists; returns
    /// the retained sequence either way.
    pub fn insert(&self, url: &str, chunks: Vec<ContentChunk>) -> Arc<Vec<ContentChunk>> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = inner.entries.get(url) {
            return Arc::clone(existing);
        }

        let stored = Arc::new(chunks);
        inner.entries.insert(url.to_string(), Arc::clone(&stored));
        inner.order.push_back(url.to_string());

        while inner.entries.len() > self.max_entries {
            if let Some(evicted) = inner.order.pop_front() {
                inner.entries.remove(&evicted);
                debug!(url = %evicted, "evicted chunk cache entry");
            }
        }

        stored
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ChunkCache {
    fn default() -> Self {
        Self::new()
    }
}
