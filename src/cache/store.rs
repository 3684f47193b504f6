//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL freshness.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::cache::entry::CacheEntry;
use crate::cache::{CacheStats, LruTracker};
use crate::config::CacheConfig;
use crate::error::Result;

/// Upper bound on slots reserved up front; larger caches grow on demand.
const PREALLOCATE_LIMIT: usize = 1024;

// == Cache Store ==
/// Unsynchronized cache storage with LRU eviction and TTL freshness.
///
/// Every method takes the current time explicitly, so the store has no hidden
/// time source. [`FreshCache`](crate::cache::FreshCache) wraps it in a mutex
/// and a [`Clock`](crate::cache::Clock); use the store directly only when a
/// single owner already serializes access.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    config: CacheConfig,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore, rejecting an invalid configuration.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    pub(crate) fn from_valid(config: CacheConfig) -> Self {
        debug_assert!(config.validate().is_ok());
        let capacity = config.max_size.min(PREALLOCATE_LIMIT);
        Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruTracker::with_capacity(capacity),
            stats: CacheStats::new(),
            config,
        }
    }

    // == Get ==
    /// Retrieves a value by key if it is still fresh.
    ///
    /// A hit moves the key to the most recently used position. A stale entry
    /// is removed and reported as a miss; an absent key changes nothing
    /// except the miss counter.
    pub fn get<Q>(&mut self, key: &Q, now: Instant) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (node, fresh) = match self.entries.get(key) {
            Some(entry) => (entry.node, entry.is_fresh(now, self.config.ttl)),
            None => {
                self.stats.record_miss();
                trace!("cache miss");
                return None;
            }
        };

        if !fresh {
            self.remove_entry(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            debug!(entries = self.entries.len(), "removed stale entry on lookup");
            return None;
        }

        self.lru.touch(node);
        self.stats.record_hit();
        trace!("cache hit");
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Put ==
    /// Stores a key-value pair stamped with `now`.
    ///
    /// If the key already exists, the value is overwritten and freshness is
    /// reset without consuming capacity. If the cache is at capacity, the
    /// least recently used entry is evicted first, fresh or not.
    pub fn put(&mut self, key: K, value: V, now: Instant) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.refresh(value, now);
            let node = entry.node;
            self.lru.touch(node);
            return;
        }

        if self.entries.len() >= self.config.max_size {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(
                    max_size = self.config.max_size,
                    "evicted least recently used entry"
                );
            }
        }

        let node = self.lru.push_front(key.clone());
        self.entries.insert(key, CacheEntry::new(value, now, node));
    }

    // == Invalidate ==
    /// Removes an entry regardless of freshness. Returns whether one existed.
    pub fn invalidate<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.remove_entry(key).is_some();
        if removed {
            debug!(entries = self.entries.len(), "invalidated cache entry");
        }
        removed
    }

    // == Clear ==
    /// Drops every entry. Statistics counters are kept.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        debug!(dropped, "cleared cache");
    }

    /// Whether `key` has a stored entry, fresh or stale. Does not touch.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Whether `key` has an entry younger than the TTL.
    ///
    /// Never removes anything and never touches recency.
    pub fn is_fresh<Q>(&self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(now, self.config.ttl))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Zeroes the counters, keeping the entry count.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Length ==
    /// Returns the number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Config ==
    /// Returns the configuration the store was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the entry cap.
    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    /// Returns the freshness window.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Keys ordered from most to least recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> + '_ {
        self.lru.iter()
    }

    fn remove_entry<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.lru.remove(entry.node);
        Some(entry)
    }

    /// Panics if the map and the recency list disagree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert!(self.entries.len() <= self.config.max_size, "over capacity");
        assert_eq!(self.entries.len(), self.lru.len(), "map/list length mismatch");
        for (key, entry) in &self.entries {
            assert!(
                self.lru.key(entry.node) == Some(key),
                "entry points at a foreign list node"
            );
        }
        assert_eq!(self.lru.iter().count(), self.entries.len());
    }
}
