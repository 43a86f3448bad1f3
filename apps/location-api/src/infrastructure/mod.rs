//! Infrastructure Layer
//!
//! Adapters and external integrations:
//!
//! - `config`: Environment-derived configuration
//! - `ksqldb`: Frame decoder, push-query relay, and REST client
//! - `redis`: Snapshot store adapter
//! - `http`: Client-facing axum endpoints and server lifecycle
//! - `telemetry`: Tracing setup

pub mod config;
pub mod http;
pub mod ksqldb;
pub mod redis;
pub mod telemetry;
