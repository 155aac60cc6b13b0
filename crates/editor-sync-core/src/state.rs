//! Last-known remote editor values.
//!
//! Owned by the synchronizer, which is the only writer. The poll loop gets a
//! `RemoteCacheReader` and can only compare against the cached values.

use std::sync::{Arc, RwLock};

/// Per-index value the synchronizer believes each editor holds.
pub struct RemoteCache {
    values: Arc<RwLock<Vec<String>>>,
}

impl RemoteCache {
    /// Create a cache with every slot set to the empty string.
    pub fn new(len: usize) -> Self {
        Self {
            values: Arc::new(RwLock::new(vec![String::new(); len])),
        }
    }

    /// Read-only handle sharing this cache.
    pub fn reader(&self) -> RemoteCacheReader {
        RemoteCacheReader {
            values: Arc::clone(&self.values),
        }
    }

    pub fn store(&self, index: usize, value: String) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = values.get_mut(index) {
            *slot = value;
        }
    }

    pub fn get(&self, index: usize) -> Option<String> {
        self.reader().get(index)
    }
}

/// Read accessor handed to the poll loop.
#[derive(Clone)]
pub struct RemoteCacheReader {
    values: Arc<RwLock<Vec<String>>>,
}

impl RemoteCacheReader {
    pub fn get(&self, index: usize) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(index).cloned()
    }

    /// Whether `value` equals the cached value for `index`.
    pub fn matches(&self, index: usize, value: &str) -> bool {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(index).is_some_and(|cached| cached == value)
    }
}
