//! Read-through query cache
//!
//! Holds rendered JSON for the expensive read tools, keyed by query
//! parameters. Every mutating tool invalidates the keys it can affect.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;
use tracing::debug;

/// A cacheable query. Dates are ISO `yyyy-MM-dd`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Day(String),
    ShoppingList { start: String, end: String },
    Summary { start: String, end: String },
    Recipes,
}

impl QueryKey {
    /// Whether the cached result depends on entries dated `date`
    fn covers(&self, date: &str) -> bool {
        match self {
            QueryKey::Day(d) => d == date,
            QueryKey::ShoppingList { start, end } | QueryKey::Summary { start, end } => {
                start.as_str() <= date && date <= end.as_str()
            }
            // eat counts
            QueryKey::Recipes => true,
        }
    }
}

struct CacheState {
    entries: LruCache<QueryKey, String>,
    /// Bumped by every invalidation
    generation: u64,
}

/// Bounded cache of rendered query results, least recently used evicted first
pub struct QueryCache {
    state: Mutex<CacheState>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
        Some(n) => n,
        None => unreachable!(),
    };

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY.get())
    }

    /// A capacity of zero falls back to the default
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &QueryKey) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    /// Return the cached value or compute, store and return it.
    /// Errors are not cached. A value computed while an invalidation ran is
    /// returned but not stored.
    pub fn get_or_try_insert<F, E>(&self, key: QueryKey, compute: F) -> Result<String, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        let generation = {
            let mut state = self.lock();
            if let Some(hit) = state.entries.get(&key) {
                debug!("Cache hit: {:?}", key);
                return Ok(hit.clone());
            }
            state.generation
        };

        debug!("Cache miss: {:?}", key);
        let value = compute()?;

        let mut state = self.lock();
        if state.generation == generation {
            state.entries.put(key, value.clone());
        } else {
            debug!("Discarded result for {:?} computed across an invalidation", key);
        }
        Ok(value)
    }

    fn remove_where(&self, stale: impl Fn(&QueryKey) -> bool) -> usize {
        let mut state = self.lock();
        state.generation += 1;
        let keys: Vec<QueryKey> = state
            .entries
            .iter()
            .filter(|&(key, _)| stale(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            state.entries.pop(key);
        }
        keys.len()
    }

    /// Drop everything that depends on entries dated `date`
    pub fn invalidate_date(&self, date: &str) {
        let removed = self.remove_where(|key| key.covers(date));
        debug!("Invalidated {} cached queries for {}", removed, date);
    }

    /// Drop every shopping list
    pub fn invalidate_shopping(&self) {
        self.remove_where(|key| matches!(key, QueryKey::ShoppingList { .. }));
    }

    pub fn invalidate_all(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.entries.clear();
        debug!("Invalidated all cached queries");
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> QueryKey {
        QueryKey::ShoppingList { start: start.to_string(), end: end.to_string() }
    }

    #[test]
    fn test_read_through() {
        let cache = QueryCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value: Result<String, String> = cache.get_or_try_insert(QueryKey::Recipes, || {
                calls += 1;
                Ok("[]".to_string())
            });
            assert_eq!(value.unwrap(), "[]");
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = QueryCache::new();
        let result: Result<String, String> =
            cache.get_or_try_insert(QueryKey::Recipes, || Err("boom".to_string()));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_date_hits_day_and_covering_ranges() {
        let cache = QueryCache::new();
        let keys = [
            QueryKey::Day("2025-01-06".to_string()),
            QueryKey::Day("2025-01-07".to_string()),
            range("2025-01-06", "2025-01-12"),
            range("2025-01-13", "2025-01-19"),
            QueryKey::Summary { start: "2025-01-01".to_string(), end: "2025-01-31".to_string() },
            QueryKey::Recipes,
        ];
        for key in keys.iter().cloned() {
            let _: Result<String, ()> = cache.get_or_try_insert(key, || Ok("x".to_string()));
        }

        cache.invalidate_date("2025-01-06");
        assert!(cache.get(&QueryKey::Day("2025-01-07".to_string())).is_some());
        assert!(cache.get(&range("2025-01-13", "2025-01-19")).is_some());
        assert_eq!(cache.len(), 2);

        cache.invalidate_shopping();
        assert_eq!(cache.len(), 1);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_result_computed_across_invalidation_is_not_stored() {
        let cache = QueryCache::new();
        let key = QueryKey::Day("2025-01-06".to_string());

        let value: Result<String, ()> = cache.get_or_try_insert(key.clone(), || {
            cache.invalidate_date("2025-01-06");
            Ok("before write".to_string())
        });
        assert_eq!(value.unwrap(), "before write");
        assert!(cache.get(&key).is_none());

        let value: Result<String, ()> =
            cache.get_or_try_insert(key.clone(), || Ok("after write".to_string()));
        assert_eq!(value.unwrap(), "after write");
        assert_eq!(cache.get(&key).as_deref(), Some("after write"));
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let cache = QueryCache::with_capacity(2);
        for end in ["2025-01-07", "2025-01-08"] {
            let _: Result<String, ()> =
                cache.get_or_try_insert(range("2025-01-06", end), || Ok("x".to_string()));
        }
        // touch the first so the second is the oldest
        assert!(cache.get(&range("2025-01-06", "2025-01-07")).is_some());
        let _: Result<String, ()> =
            cache.get_or_try_insert(range("2025-01-06", "2025-01-09"), || Ok("x".to_string()));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&range("2025-01-06", "2025-01-08")).is_none());
        assert!(cache.get(&range("2025-01-06", "2025-01-07")).is_some());
    }
}
