//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with freshness tracking.

use std::time::{Duration, Instant};

use crate::cache::lru::NodeId;

// == Cache Entry ==
/// A stored value plus the metadata needed for freshness and recency.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub(crate) value: V,
    /// Time of the last write for this key
    pub(crate) inserted_at: Instant,
    /// Position in the recency list
    pub(crate) node: NodeId,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, inserted_at: Instant, node: NodeId) -> Self {
        Self {
            value,
            inserted_at,
            node,
        }
    }

    // == Age ==
    /// Time elapsed since the entry was written.
    ///
    /// Saturates to zero if `now` precedes `inserted_at`.
    pub(crate) fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    // == Is Fresh ==
    /// Checks whether the entry is still within its freshness window.
    ///
    /// Boundary condition: an entry whose age equals `ttl` is stale.
    pub(crate) fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    // == Refresh ==
    /// Replaces the value and restarts the freshness window.
    pub(crate) fn refresh(&mut self, value: V, now: Instant) {
        self.value = value;
        self.inserted_at = now;
    }
}
