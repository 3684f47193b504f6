//! Configuration Module
//!
//! Handles building, loading and validating cache configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CacheError, Result};

/// Default maximum number of entries.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default freshness window (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Environment variable holding the entry cap.
pub const MAX_SIZE_ENV: &str = "FRESH_CACHE_MAX_SIZE";

/// Environment variable holding the TTL in milliseconds.
pub const TTL_MS_ENV: &str = "FRESH_CACHE_TTL_MS";

/// Cache configuration parameters.
///
/// Fixed once a cache is built from it. Serialized with the TTL expressed in
/// milliseconds (`ttl_ms`) so it can sit in a caller's own config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// How long an entry stays fresh after its last write
    #[serde(rename = "ttl_ms", with = "duration_ms")]
    pub ttl: Duration,
}

impl CacheConfig {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self { max_size, ttl }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FRESH_CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `FRESH_CACHE_TTL_MS` - Freshness window in milliseconds (default: 300000)
    ///
    /// Values that are missing or fail to parse fall back to the defaults.
    /// The result is not validated; a cache built from it will be.
    pub fn from_env() -> Self {
        Self {
            max_size: env_or(MAX_SIZE_ENV, DEFAULT_MAX_SIZE),
            ttl: Duration::from_millis(env_or(TTL_MS_ENV, duration_ms::as_millis(DEFAULT_TTL))),
        }
    }

    // == Validate ==
    /// Rejects configurations a cache cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            ttl: DEFAULT_TTL,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "ignoring unparsable cache setting");
            default
        }),
        Err(_) => default,
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn as_millis(duration: Duration) -> u64 {
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
    }

    pub(super) fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(as_millis(*duration))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_size, 100);
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = CacheConfig::default()
            .with_max_size(10)
            .with_ttl(Duration::from_secs(120));
        assert_eq!(config, CacheConfig::new(10, Duration::from_secs(120)));
    }

    #[test]
    fn test_config_rejects_zero_size() {
        let config = CacheConfig::default().with_max_size(0);
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_accepts_zero_ttl() {
        let config = CacheConfig::default().with_ttl(Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        // Single test owns these variables to avoid races between tests
        env::remove_var(MAX_SIZE_ENV);
        env::remove_var(TTL_MS_ENV);
        assert_eq!(CacheConfig::from_env(), CacheConfig::default());

        env::set_var(MAX_SIZE_ENV, "25");
        env::set_var(TTL_MS_ENV, "1500");
        let config = CacheConfig::from_env();
        assert_eq!(config.max_size, 25);
        assert_eq!(config.ttl, Duration::from_millis(1500));

        env::set_var(MAX_SIZE_ENV, "lots");
        env::set_var(TTL_MS_ENV, "-1");
        assert_eq!(CacheConfig::from_env(), CacheConfig::default());

        env::remove_var(MAX_SIZE_ENV);
        env::remove_var(TTL_MS_ENV);
    }

    #[test]
    fn test_config_serde_uses_millis() {
        let config = CacheConfig::new(10, Duration::from_secs(120));
        let json = serde_json::to_value(config).unwrap();
        assert_eq!(json, serde_json::json!({ "max_size": 10, "ttl_ms": 120000 }));

        let parsed: CacheConfig = serde_json::from_str(r#"{"ttl_ms": 2000}"#).unwrap();
        assert_eq!(parsed, CacheConfig::new(100, Duration::from_secs(2)));
    }
}
