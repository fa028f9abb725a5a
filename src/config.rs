//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::upstream::UpstreamTarget;

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream tokeninfo URL (scheme, host, fixed path)
    pub upstream_url: String,
    /// Maximum number of cached tokens, 0 disables caching
    pub cache_max_entries: usize,
    /// Cache entry TTL in seconds, 0 disables caching
    pub cache_ttl_secs: u64,
    /// Upstream call timeout in milliseconds
    pub upstream_timeout_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds, 0 disables the sweeper
    pub cleanup_interval_secs: u64,
}

/// Reads `name` and parses it, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `UPSTREAM_URL` - Upstream tokeninfo URL (default: http://127.0.0.1:9021/oauth2/tokeninfo)
    /// - `CACHE_MAX_ENTRIES` - Maximum cached tokens (default: 10000)
    /// - `CACHE_TTL_SECS` - Cache entry TTL in seconds (default: 60)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream timeout in milliseconds (default: 2000)
    /// - `SERVER_PORT` - HTTP server port (default: 9020)
    /// - `CLEANUP_INTERVAL_SECS` - Expiry sweep frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", defaults.cache_ttl_secs),
            upstream_timeout_ms: env_or("UPSTREAM_TIMEOUT_MS", defaults.upstream_timeout_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval_secs: env_or(
                "CLEANUP_INTERVAL_SECS",
                defaults.cleanup_interval_secs,
            ),
        }
    }

    /// Rejects settings the proxy cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream_timeout_ms == 0 {
            return Err(ConfigError::ZeroUpstreamTimeout);
        }
        UpstreamTarget::parse(&self.upstream_url)?;
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_url: "http://127.0.0.1:9021/oauth2/tokeninfo".to_string(),
            cache_max_entries: 10_000,
            cache_ttl_secs: 60,
            upstream_timeout_ms: 2_000,
            server_port: 9020,
            cleanup_interval_secs: 30,
        }
    }
}
