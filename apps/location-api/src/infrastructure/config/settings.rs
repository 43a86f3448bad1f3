//! API Configuration Settings
//!
//! Configuration types for the location API, loaded from environment
//! variables. Upstream addresses and credentials are never hardcoded; they
//! are resolved once at process start and passed into the adapters that
//! open connections.

use std::time::Duration;

/// ksqlDB connection settings.
#[derive(Debug, Clone)]
pub struct KsqlSettings {
    /// Base URL of the ksqlDB REST API.
    pub base_url: String,
    /// Idle window on push sessions before the relay gives up.
    pub idle_timeout: Duration,
    /// Connect timeout for upstream requests.
    pub connect_timeout: Duration,
}

impl Default for KsqlSettings {
    fn default() -> Self {
        Self {
            base_url: "http://ksqldb-server:8088".to_string(),
            idle_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Redis connection settings.
#[derive(Clone)]
pub struct RedisSettings {
    /// Connection URL, e.g. `redis://:password@host:6379/1`.
    pub url: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/1".to_string(),
        }
    }
}

// The URL may embed a password, so it never appears in logs.
impl std::fmt::Debug for RedisSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSettings")
            .field("url", &"[REDACTED]")
            .finish()
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Listen port for the client-facing API.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

/// Complete API configuration.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// ksqlDB connection settings.
    pub ksql: KsqlSettings,
    /// Redis connection settings.
    pub redis: RedisSettings,
}

impl ApiConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a recognized variable is set to an empty value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_env_string("KSQLDB_URL", &KsqlSettings::default().base_url)?;
        let redis_url = parse_env_string("REDIS_URL", &RedisSettings::default().url)?;

        let ksql = KsqlSettings {
            base_url,
            idle_timeout: parse_env_duration_secs(
                "KSQLDB_IDLE_TIMEOUT_SECS",
                KsqlSettings::default().idle_timeout,
            ),
            connect_timeout: parse_env_duration_secs(
                "KSQLDB_CONNECT_TIMEOUT_SECS",
                KsqlSettings::default().connect_timeout,
            ),
        };

        let server = ServerSettings {
            port: parse_env_u16("LOCATION_API_PORT", ServerSettings::default().port),
        };

        Ok(Self {
            server,
            ksql,
            redis: RedisSettings { url: redis_url },
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn parse_env_string(key: &str, default: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.is_empty() => Err(ConfigError::EmptyValue(key.to_string())),
        Ok(value) => Ok(value),
        Err(_) => Ok(default.to_string()),
    }
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
