//! Fresh Cache - A bounded in-memory cache
//!
//! Combines least-recently-used eviction with time-to-live freshness, for
//! memoizing expensive network or inference calls. Stale entries are dropped
//! lazily when looked up; there is no background sweeper.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, Clock, FreshCache, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
