use std::{env, time::Duration};

use kvcache_core::cache::ExpiryMode;

/// Default Redis connection URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

const DEFAULT_HEALTH_INTERVAL_MS: u64 = 5_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Store backend behind the facade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Redis server reached over the network.
    #[default]
    Redis,
    /// In-process store with the same semantics, for tests and local runs.
    Memory,
}

/// Facade configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL (default: "redis://127.0.0.1:6379")
    pub redis_url: String,
    /// Store backend (default: redis)
    pub backend: Backend,
    /// How values and expirations are written (default: atomic)
    pub expiry_mode: ExpiryMode,
    /// Interval between liveness probes in milliseconds (default: 5,000)
    pub health_interval_ms: u64,
    /// Upper bound for a single Redis connection attempt in milliseconds (default: 2,000)
    pub connect_timeout_ms: u64,
    /// Maximum number of entries in the memory backend (default: 10,000)
    pub max_entries: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `REDIS_URL` - Redis connection URL (default: "redis://127.0.0.1:6379")
    /// - `CACHE_BACKEND` - "redis" or "memory" (default: "redis")
    /// - `CACHE_EXPIRY_MODE` - "atomic" or "separate" (default: "atomic")
    /// - `CACHE_HEALTH_INTERVAL_MS` - Liveness probe interval (default: 5,000)
    /// - `CACHE_CONNECT_TIMEOUT_MS` - Redis connection attempt timeout (default: 2,000)
    /// - `CACHE_MAX_ENTRIES` - Memory backend capacity (default: 10,000)
    ///
    /// Unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            backend: lookup("CACHE_BACKEND")
                .and_then(|v| <Backend as clap::ValueEnum>::from_str(&v, true).ok())
                .unwrap_or_default(),
            expiry_mode: lookup("CACHE_EXPIRY_MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            health_interval_ms: lookup("CACHE_HEALTH_INTERVAL_MS")
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_HEALTH_INTERVAL_MS),
            connect_timeout_ms: lookup("CACHE_CONNECT_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            max_entries: lookup("CACHE_MAX_ENTRIES")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_ENTRIES),
        }
    }

    /// Get the liveness probe interval as a Duration.
    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    /// Get the connection attempt timeout as a Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.backend, Backend::Redis);
        assert_eq!(config.expiry_mode, ExpiryMode::Atomic);
        assert_eq!(config.health_interval_ms, 5_000);
        assert_eq!(config.connect_timeout(), Duration::from_secs(2));
        assert_eq!(config.max_entries, 10_000);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("REDIS_URL", "redis://cache.internal:6380/2"),
            ("CACHE_BACKEND", "Memory"),
            ("CACHE_EXPIRY_MODE", "separate"),
            ("CACHE_HEALTH_INTERVAL_MS", "250"),
            ("CACHE_CONNECT_TIMEOUT_MS", "150"),
            ("CACHE_MAX_ENTRIES", "64"),
        ]));

        assert_eq!(config.redis_url, "redis://cache.internal:6380/2");
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.expiry_mode, ExpiryMode::Separate);
        assert_eq!(config.health_interval(), Duration::from_millis(250));
        assert_eq!(config.connect_timeout(), Duration::from_millis(150));
        assert_eq!(config.max_entries, 64);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("CACHE_BACKEND", "memcached"),
            ("CACHE_EXPIRY_MODE", "sometimes"),
            ("CACHE_HEALTH_INTERVAL_MS", "0"),
            ("CACHE_CONNECT_TIMEOUT_MS", "soon"),
            ("CACHE_MAX_ENTRIES", "-5"),
        ]));

        assert_eq!(config.backend, Backend::Redis);
        assert_eq!(config.expiry_mode, ExpiryMode::Atomic);
        assert_eq!(config.health_interval_ms, 5_000);
        assert_eq!(config.connect_timeout_ms, 2_000);
        assert_eq!(config.max_entries, 10_000);
    }
}
