//! Cache Module
//!
//! Provides in-memory caching with LRU eviction and TTL freshness.

mod clock;
mod entry;
mod fresh_cache;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use fresh_cache::FreshCache;
pub use lru::{LruTracker, NodeId};
pub use stats::CacheStats;
pub use store::CacheStore;
