//! Process-lifetime cache of finalized search results.
//!
//! Entries are keyed by the normalized query and the effective limit, so a
//! query first asked with a small limit never truncates a later, larger
//! request. Entries live as long as the engine that owns the cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::search::outputs::SearchResult;

/// Shared, immutable result list
pub type CachedResults = Arc<Vec<SearchResult>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    limit: usize,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, CachedResults>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached results for a normalized query and effective limit
    pub fn get(&self, query: &str, limit: usize) -> Option<CachedResults> {
        let key = CacheKey {
            query: query.to_string(),
            limit,
        };
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&key) {
            Some(results) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(results))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store results; a concurrent insert for the same key may overwrite
    pub fn insert(&self, query: &str, limit: usize, results: CachedResults) {
        let key = CacheKey {
            query: query.to_string(),
            limit,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, results);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
