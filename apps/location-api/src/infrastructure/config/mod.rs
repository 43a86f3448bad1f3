//! Configuration Module
//!
//! Environment-derived configuration for the location API.

mod settings;

pub use settings::{ApiConfig, ConfigError, KsqlSettings, RedisSettings, ServerSettings};
