//! Memo of filtered row sets keyed by filter settings

use std::sync::Arc;

use ahash::AHashMap;
use hd_core::{FilterSpec, Row};
use parking_lot::Mutex;
use serde::Serialize;

struct CachedRows {
    rows: Arc<[Row]>,
    last_used: u64,
}

#[derive(Default)]
struct CacheInner {
    entries: AHashMap<FilterSpec, CachedRows>,
    tick: u64,
    hits: u64,
    misses: u64,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Least-recently-used cache of filter results
pub struct FilterCache {
    inner: Mutex<CacheInner>,
    /// Maximum number of filter results to keep
    capacity: usize,
}

impl FilterCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, spec: &FilterSpec) -> Option<Arc<[Row]>> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.tick += 1;
        match inner.entries.get_mut(spec) {
            Some(entry) => {
                entry.last_used = inner.tick;
                inner.hits += 1;
                Some(entry.rows.clone())
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    pub fn put(&self, spec: FilterSpec, rows: Arc<[Row]>) {
        let mut inner = self.inner.lock();
        inner.tick += 1;
        let last_used = inner.tick;

        if inner.entries.len() >= self.capacity && !inner.entries.contains_key(&spec) {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                inner.entries.remove(&key);
            }
        }

        inner.entries.insert(spec, CachedRows { rows, last_used });
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_core::WeekRange;

    fn spec(min: u32, max: u32) -> FilterSpec {
        FilterSpec {
            range: WeekRange::new(min, max).unwrap(),
            ..FilterSpec::default()
        }
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = FilterCache::new(2);
        let empty: Arc<[Row]> = Vec::new().into();
        cache.put(spec(1, 10), empty.clone());
        cache.put(spec(2, 10), empty.clone());
        assert!(cache.get(&spec(1, 10)).is_some());

        cache.put(spec(3, 10), empty);
        assert!(cache.get(&spec(2, 10)).is_none());
        assert!(cache.get(&spec(1, 10)).is_some());
        assert!(cache.get(&spec(3, 10)).is_some());

        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
    }
}
