//! Thread-safe cache handle.
//!
//! [`FreshCache`] puts one [`CacheStore`] behind one mutex and reads time
//! from an injected [`Clock`]. Every operation is a single short critical
//! section; nothing runs in the background.

use std::borrow::Borrow;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::cache::{CacheStats, CacheStore, Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;

// == Fresh Cache ==
/// A bounded key-value cache with LRU eviction and TTL freshness.
///
/// Share it between threads or tasks with `Arc`. Values are handed out as
/// clones; store `Arc<T>` to hand out the same allocation every time.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use fresh_cache::{CacheConfig, FreshCache};
///
/// let cache = FreshCache::new(CacheConfig::new(2, Duration::from_secs(60))).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// assert_eq!(cache.get(&"a"), Some(1));
///
/// // "b" is now least recently used
/// cache.put("c", 3);
/// assert!(!cache.contains_key(&"b"));
/// ```
pub struct FreshCache<K, V, C = SystemClock> {
    inner: Mutex<CacheStore<K, V>>,
    clock: C,
}

impl<K, V> FreshCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructors ==
    /// Creates a cache on the system clock, rejecting an invalid config.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Creates a cache with the default 100 entries and 5 minute TTL.
    pub fn with_defaults() -> Self {
        Self {
            inner: Mutex::new(CacheStore::from_valid(CacheConfig::default())),
            clock: SystemClock,
        }
    }
}

impl<K, V> Default for FreshCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<K, V, C> FreshCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: C) -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(CacheStore::new(config)?),
            clock,
        })
    }

    // == Get ==
    /// Returns a clone of the value if the entry exists and is fresh.
    ///
    /// A stale entry is removed and reported as `None`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_with(key, V::clone)
    }

    /// Like [`get`](Self::get) but lends the value to `f` instead of cloning.
    ///
    /// `f` runs while the cache is locked; keep it short and do not call back
    /// into the same cache from it.
    pub fn get_with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        let mut store = self.inner.lock();
        let now = self.clock.now();
        store.get(key, now).map(f)
    }

    // == Put ==
    /// Inserts or refreshes an entry, evicting the LRU entry when full.
    pub fn put(&self, key: K, value: V) {
        let mut store = self.inner.lock();
        let now = self.clock.now();
        store.put(key, value, now);
    }

    // == Invalidate ==
    /// Removes the entry for `key` if present. Idempotent.
    pub fn invalidate<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().invalidate(key);
    }

    // == Clear ==
    /// Drops every entry in one critical section. Statistics are kept.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    // == Size ==
    /// Number of stored entries, including stale ones not yet removed.
    pub fn size(&self) -> usize {
        self.inner.lock().len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored, fresh or stale.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    // == Contains Key ==
    /// Whether an entry exists, fresh or stale. Does not count as an access.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains_key(key)
    }

    // == Is Fresh ==
    /// Whether an entry exists and is younger than the TTL.
    ///
    /// Unlike [`get`](Self::get) this never removes a stale entry and never
    /// changes eviction order.
    pub fn is_fresh<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let store = self.inner.lock();
        let now = self.clock.now();
        store.is_fresh(key, now)
    }

    // == Stats ==
    /// Returns a snapshot of the counters and the current entry count.
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    // == Reset Stats ==
    /// Zeroes hit, miss, eviction and expiration counters.
    pub fn reset_stats(&self) {
        self.inner.lock().reset_stats();
    }

    // == Config ==
    /// Returns the configuration the cache was built with.
    pub fn config(&self) -> CacheConfig {
        *self.inner.lock().config()
    }

    // == Max Size ==
    /// Returns the entry cap.
    pub fn max_size(&self) -> usize {
        self.config().max_size
    }

    // == TTL ==
    /// Returns the freshness window.
    pub fn ttl(&self) -> Duration {
        self.config().ttl
    }

    // == Memoization ==
    /// Returns the fresh cached value, or computes, stores and returns one.
    ///
    /// `f` runs outside the lock, so concurrent misses on the same key may
    /// each compute a value; the last write wins.
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        V: Clone,
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }

        let value = f();
        self.put(key, value.clone());
        value
    }

    /// Fallible [`get_or_insert_with`](Self::get_or_insert_with).
    ///
    /// An error from `f` is returned as-is and nothing is cached.
    pub fn get_or_try_insert_with<F, E>(&self, key: K, f: F) -> std::result::Result<V, E>
    where
        V: Clone,
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = f()?;
        self.put(key, value.clone());
        Ok(value)
    }

    /// Async memoization in front of an expensive fetch.
    ///
    /// The lock is never held across the fetch's `.await`. A failed fetch is
    /// returned as-is and leaves the cache untouched.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> std::result::Result<V, E>
    where
        V: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        trace!("fetching value for cache miss");
        let value = fetch().await?;
        self.put(key, value.clone());
        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.inner.lock().assert_consistent();
    }
}

impl<K, V, C> fmt::Debug for FreshCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.inner.lock();
        f.debug_struct("FreshCache")
            .field("config", store.config())
            .field("len", &store.len())
            .field("clock", &self.clock)
            .finish()
    }
}
