//! Loaded-dataset cache
//!
//! Parsing the merged table is the expensive step of an interaction, so
//! datasets are cached per source descriptor and every filter change reuses
//! the cached batch. The cache is explicit: switching or re-uploading a
//! source produces a new key, and callers invalidate a key when they know
//! the underlying source changed.

use crate::source::DataSource;
use arrow::array::RecordBatch;
use dashmap::DashMap;
use std::sync::Arc;

/// Dataset cache keyed by [`DataSource::cache_key`].
pub struct DatasetCache {
    store: DashMap<String, Arc<RecordBatch>>,
}

impl DatasetCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Cached dataset for `source`, if any.
    #[must_use]
    pub fn get(&self, source: &DataSource) -> Option<Arc<RecordBatch>> {
        self.store
            .get(&source.cache_key())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Store the dataset loaded from `source`, returning a shared handle.
    pub fn insert(&self, source: &DataSource, batch: RecordBatch) -> Arc<RecordBatch> {
        let shared = Arc::new(batch);
        self.store
            .insert(source.cache_key(), Arc::clone(&shared));
        shared
    }

    /// Drop the cached dataset for `source`. No-op if absent.
    pub fn invalidate(&self, source: &DataSource) {
        self.store.remove(&source.cache_key());
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Number of cached datasets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}
