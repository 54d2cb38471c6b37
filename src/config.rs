//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default upstream API root.
pub const DEFAULT_BASE_URL: &str = "https://buildout.com/api/v1";

/// Which key-value store backs the read-through cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// External Redis store at `REDIS_URL`
    Redis,
    /// In-process TTL store
    Memory,
    /// No store; every lookup is a miss
    None,
}

impl CacheBackend {
    fn resolve(requested: Option<&str>, redis_url: Option<&str>) -> Self {
        match requested.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("memory") => CacheBackend::Memory,
            Some("none") | Some("off") => CacheBackend::None,
            Some("redis") if redis_url.is_some() => CacheBackend::Redis,
            _ if redis_url.is_some() => CacheBackend::Redis,
            _ => CacheBackend::None,
        }
    }
}

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API credential; fetches fail without it
    pub api_key: Option<String>,
    /// Upstream API root URL
    pub base_url: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// Page size used when a request does not supply `limit`
    pub default_page_limit: u32,
    /// External key-value store connection string
    pub redis_url: Option<String>,
    /// Selected cache backend
    pub cache_backend: CacheBackend,
    /// Cache entry TTL in seconds
    pub cache_ttl: u64,
    /// Namespace prefix for every cache key
    pub cache_prefix: String,
    /// Capacity of the in-process store
    pub memory_max_entries: usize,
    /// In-process store cleanup interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BUILDOUT_API_KEY` - Upstream credential (default: unset)
    /// - `BUILDOUT_BASE_URL` - Upstream root (default: https://buildout.com/api/v1)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream timeout (default: 30)
    /// - `DEFAULT_PAGE_LIMIT` - Page size (default: 100)
    /// - `REDIS_URL` - Key-value store connection string (default: unset)
    /// - `CACHE_BACKEND` - `redis`, `memory` or `none` (default: redis if `REDIS_URL` is set)
    /// - `CACHE_TTL` - Entry TTL in seconds (default: 3600)
    /// - `CACHE_PREFIX` - Key namespace (default: buildout)
    /// - `MEMORY_MAX_ENTRIES` - In-process store capacity (default: 1000)
    /// - `CLEANUP_INTERVAL` - In-process cleanup frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let redis_url = non_empty_var("REDIS_URL");
        let cache_backend = CacheBackend::resolve(
            non_empty_var("CACHE_BACKEND").as_deref(),
            redis_url.as_deref(),
        );

        Self {
            api_key: non_empty_var("BUILDOUT_API_KEY"),
            base_url: non_empty_var("BUILDOUT_BASE_URL").unwrap_or(defaults.base_url),
            upstream_timeout: parsed_var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout),
            default_page_limit: parsed_var("DEFAULT_PAGE_LIMIT")
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.default_page_limit),
            redis_url,
            cache_backend,
            cache_ttl: parsed_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            cache_prefix: non_empty_var("CACHE_PREFIX").unwrap_or(defaults.cache_prefix),
            memory_max_entries: parsed_var("MEMORY_MAX_ENTRIES")
                .unwrap_or(defaults.memory_max_entries),
            cleanup_interval: parsed_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            server_port: parsed_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Cache entry TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            upstream_timeout: 30,
            default_page_limit: 100,
            redis_url: None,
            cache_backend: CacheBackend::None,
            cache_ttl: 3600,
            cache_prefix: "buildout".to_string(),
            memory_max_entries: 1000,
            cleanup_interval: 60,
            server_port: 3000,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.cache_prefix, "buildout");
        assert_eq!(config.cache_backend, CacheBackend::None);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_backend_resolution() {
        assert_eq!(CacheBackend::resolve(None, None), CacheBackend::None);
        assert_eq!(
            CacheBackend::resolve(None, Some("redis://localhost")),
            CacheBackend::Redis
        );
        assert_eq!(
            CacheBackend::resolve(Some("Memory"), Some("redis://localhost")),
            CacheBackend::Memory
        );
        assert_eq!(
            CacheBackend::resolve(Some("none"), Some("redis://localhost")),
            CacheBackend::None
        );
        // Asking for redis without a connection string disables caching
        assert_eq!(CacheBackend::resolve(Some("redis"), None), CacheBackend::None);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "BUILDOUT_API_KEY",
            "BUILDOUT_BASE_URL",
            "UPSTREAM_TIMEOUT_SECS",
            "DEFAULT_PAGE_LIMIT",
            "REDIS_URL",
            "CACHE_BACKEND",
            "CACHE_TTL",
            "CACHE_PREFIX",
            "MEMORY_MAX_ENTRIES",
            "CLEANUP_INTERVAL",
            "SERVER_PORT",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert!(config.api_key.is_none());
        assert!(config.redis_url.is_none());
        assert_eq!(config.cache_backend, CacheBackend::None);
        assert_eq!(config.default_page_limit, 100);
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.upstream_timeout, 30);
        assert_eq!(config.cleanup_interval, 60);
    }
}
