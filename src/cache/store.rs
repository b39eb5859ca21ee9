//! TTL store for filtered result pages.
//!
//! Keyed by request shape (see [`super::keys`]). Every entry expires a
//! fixed interval after insertion; expired entries are dropped lazily on
//! read and proactively by the periodic sweep. An LRU bound caps memory
//! since nothing else does.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::{counter, gauge};

use crate::application::responses::FilteredResponsePage;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

const METRIC_HIT: &str = "setaccio_cache_hit_total";
const METRIC_MISS: &str = "setaccio_cache_miss_total";
const METRIC_EXPIRED: &str = "setaccio_cache_expired_total";
const METRIC_EVICTED: &str = "setaccio_cache_evicted_total";
const METRIC_ENTRIES: &str = "setaccio_cache_entries";

struct CacheEntry {
    page: FilteredResponsePage,
    expires_at: Instant,
}

/// In-process response cache with per-entry TTL expiration.
///
/// Concurrent `get`/`set`/`sweep` are safe; the write lock is held only
/// for the duration of a single map operation. Reads never return a page
/// past its expiry.
pub struct ResponseStore {
    entries: RwLock<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.max_entries_non_zero())),
            ttl: config.ttl(),
        }
    }

    /// Fetch a live entry. Expired entries are removed on the way out and
    /// reported as misses; `set` is the only way to refresh a key.
    pub fn get(&self, key: &str) -> Option<FilteredResponsePage> {
        let mut guard = rw_write(&self.entries, SOURCE, "get");
        match guard.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                counter!(METRIC_HIT).increment(1);
                Some(entry.page.clone())
            }
            Some(_) => {
                guard.pop(key);
                counter!(METRIC_EXPIRED).increment(1);
                counter!(METRIC_MISS).increment(1);
                gauge!(METRIC_ENTRIES).set(guard.len() as f64);
                None
            }
            None => {
                counter!(METRIC_MISS).increment(1);
                None
            }
        }
    }

    /// Insert or overwrite, resetting the expiry clock either way.
    pub fn set(&self, key: String, page: FilteredResponsePage) {
        let entry = CacheEntry {
            page,
            expires_at: Instant::now() + self.ttl,
        };
        let mut guard = rw_write(&self.entries, SOURCE, "set");
        if let Some((displaced, _)) = guard.push(key.clone(), entry)
            && displaced != key
        {
            // Capacity eviction, not an overwrite of the same key.
            counter!(METRIC_EVICTED).increment(1);
        }
        gauge!(METRIC_ENTRIES).set(guard.len() as f64);
    }

    /// Drop every expired entry, returning how many were removed.
    ///
    /// Runs on a fixed interval independent of read traffic so idle keys
    /// do not pin memory for longer than their TTL.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut guard = rw_write(&self.entries, SOURCE, "sweep");
        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            guard.pop(key);
        }
        if !expired.is_empty() {
            counter!(METRIC_EXPIRED).increment(expired.len() as u64);
            gauge!(METRIC_ENTRIES).set(guard.len() as f64);
        }
        expired.len()
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    fn sample_page(total: u64) -> FilteredResponsePage {
        FilteredResponsePage {
            responses: Vec::new(),
            total_responses: total,
            page_count: total.div_ceil(10),
        }
    }

    fn store_with(config: CacheConfig) -> ResponseStore {
        ResponseStore::new(&config)
    }

    #[test]
    fn roundtrip_within_ttl() {
        let store = store_with(CacheConfig::default());

        assert!(store.get("k").is_none());
        store.set("k".to_string(), sample_page(3));

        let cached = store.get("k").expect("cached page");
        assert_eq!(cached.total_responses, 3);
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let store = store_with(CacheConfig::default());
        store.set("k".to_string(), sample_page(1));
        store.set("k".to_string(), sample_page(2));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k").expect("cached page").total_responses, 2);
    }

    #[test]
    fn expired_entry_reads_as_absent() {
        // Zero TTL expires entries at insertion time.
        let store = store_with(CacheConfig {
            ttl_seconds: 0,
            ..Default::default()
        });
        store.set("k".to_string(), sample_page(1));

        assert!(store.get("k").is_none());
        // The stale entry was dropped by the read.
        assert!(store.is_empty());
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let expiring = store_with(CacheConfig {
            ttl_seconds: 0,
            ..Default::default()
        });
        expiring.set("a".to_string(), sample_page(1));
        expiring.set("b".to_string(), sample_page(2));
        assert_eq!(expiring.sweep(), 2);
        assert!(expiring.is_empty());

        let fresh = store_with(CacheConfig::default());
        fresh.set("a".to_string(), sample_page(1));
        assert_eq!(fresh.sweep(), 0);
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let store = store_with(CacheConfig {
            max_entries: 2,
            ..Default::default()
        });
        store.set("a".to_string(), sample_page(1));
        store.set("b".to_string(), sample_page(2));

        // Touch "a" so "b" becomes the eviction candidate.
        assert!(store.get("a").is_some());
        store.set("c".to_string(), sample_page(3));

        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let store = store_with(CacheConfig::default());

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store.entries.write().expect("entries lock");
            panic!("poison entries lock");
        }));

        store.set("k".to_string(), sample_page(1));
        assert!(store.get("k").is_some());
    }
}
