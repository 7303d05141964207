//! In-memory cache of search outcomes keyed by canonical query.
//!
//! Two searches missing on the same key both run and both store their
//! outcome; the later one wins.

use std::{num::NonZeroUsize, sync::Arc};

use lru::LruCache;
use parking_lot::Mutex;

use crate::SearchOutcome;

/// Bounded LRU map from query key to outcome. Capacity 0 disables caching.
pub struct ResultCache {
    /// Entries, absent when caching is disabled.
    entries: Option<Mutex<LruCache<String, Arc<SearchOutcome>>>>,
}

impl ResultCache {
    /// Creates a cache holding up to `capacity` outcomes.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// Returns the outcome cached under `key`, marking it recently used.
    pub fn get(&self, key: &str) -> Option<Arc<SearchOutcome>> {
        self.entries.as_ref()?.lock().get(key).cloned()
    }

    /// Stores `outcome` under `key`.
    pub fn put(&self, key: String, outcome: Arc<SearchOutcome>) {
        if let Some(entries) = &self.entries {
            entries.lock().put(key, outcome);
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.lock().clear();
        }
    }

    /// Number of cached outcomes.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.lock().len())
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let cache = ResultCache::new(2);
        cache.put("a".into(), Arc::default());
        cache.put("b".into(), Arc::default());
        assert!(cache.get("a").is_some());
        cache.put("c".into(), Arc::default());
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = ResultCache::new(0);
        cache.put("a".into(), Arc::default());
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties() {
        let cache = ResultCache::new(4);
        cache.put("a".into(), Arc::default());
        cache.clear();
        assert!(cache.is_empty());
    }
}
