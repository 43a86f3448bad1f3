#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Location API - Vehicle Position Service
//!
//! Exposes live and snapshot vehicle-location data to browser clients by
//! querying two backing stores: Redis holds the latest known position per
//! vehicle, and ksqlDB serves both one-shot pull queries and continuous
//! push queries over its REST API.
//!
//! The core of the service is the push-query relay: one long-lived chunked
//! HTTP request per downstream client, incrementally decoded into frames
//! and republished as a newline-delimited JSON stream.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Core location types with no external dependencies
//! - **Application**: Port definitions for backing stores
//! - **Infrastructure**: Adapters and external integrations
//!   - `ksqldb`: Frame decoder, push-query relay, and REST client
//!   - `redis`: Snapshot store adapter
//!   - `http`: Client-facing axum endpoints
//!   - `config`: Environment-derived configuration
//!   - `telemetry`: Tracing setup
//!
//! # Data Flow
//!
//! ```text
//! Redis ("latest position") ----> GET /redis        (sorted JSON snapshot)
//! ksqlDB /query ----------------> GET /ksqldb       (sorted JSON snapshot)
//! ksqlDB /query-stream ---------> GET /ksqldb-push  (unbounded NDJSON stream)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core location types with no external dependencies.
pub mod domain;

/// Application layer - Port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::location::{LocationSnapshot, VehicleLocation};

// Ports
pub use application::ports::{SnapshotError, SnapshotStore};

// Infrastructure config
pub use infrastructure::config::{ApiConfig, ConfigError, KsqlSettings, RedisSettings};

// ksqlDB client and relay (for integration tests)
pub use infrastructure::ksqldb::{
    EventStream, FrameDecoder, KsqlClient, KsqlError, PushSession, RelayError,
};

// Redis adapter
pub use infrastructure::redis::RedisSnapshotStore;

// HTTP server
pub use infrastructure::http::{ApiServer, AppState, ServerError, create_router};

// Telemetry
pub use infrastructure::telemetry::init as init_telemetry;
