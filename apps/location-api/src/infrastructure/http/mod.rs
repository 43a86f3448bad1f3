//! Client-Facing HTTP Surface
//!
//! axum endpoints for browser clients, CORS open to all origins:
//!
//! - `GET /redis` - latest positions from the key-value store, sorted
//! - `GET /ksqldb` - latest positions via a one-shot pull query, sorted
//! - `GET /ksqldb-push` - continuous change events as one JSON line each
//! - `GET /health` - liveness probe
//!
//! Upstream failures before a stream starts surface as HTTP 502. Once a
//! push stream is open, a failure ends the chunked response; forwarded
//! events are never retracted.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::application::ports::{SnapshotError, SnapshotStore};
use crate::domain::location::LocationSnapshot;
use crate::infrastructure::ksqldb::{EventStream, KsqlClient, KsqlError};

// =============================================================================
// Application State
// =============================================================================

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Latest-position snapshot store.
    pub snapshots: Arc<dyn SnapshotStore>,
    /// ksqlDB query client.
    pub ksql: Arc<KsqlClient>,
}

// =============================================================================
// Router
// =============================================================================

/// Create the axum router with all endpoints.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/redis", get(redis_snapshot))
        .route("/ksqldb", get(ksqldb_snapshot))
        .route("/ksqldb-push", get(ksqldb_push))
        .layer(cors_layer())
        .with_state(state)
}

/// CORS: all origins, all methods, all headers.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness probe.
async fn health() -> &'static str {
    "OK"
}

/// Latest positions from the key-value store, sorted by vehicle id.
async fn redis_snapshot(
    State(state): State<AppState>,
) -> Result<Json<LocationSnapshot>, ApiError> {
    let locations = state.snapshots.latest_locations().await?;
    Ok(Json(LocationSnapshot::new(locations)))
}

/// Latest positions via a one-shot ksqlDB pull query, sorted by vehicle id.
async fn ksqldb_snapshot(
    State(state): State<AppState>,
) -> Result<Json<LocationSnapshot>, ApiError> {
    let locations = state.ksql.pull_current_locations().await?;
    Ok(Json(LocationSnapshot::new(locations)))
}

/// Continuous change events, one JSON object per line, unbounded.
///
/// The upstream connection is opened before the response starts, so a
/// rejected or unreachable upstream still surfaces as a status code.
async fn ksqldb_push(State(state): State<AppState>) -> Result<Response, ApiError> {
    let events = state.ksql.push_current_locations().await?;
    let body = Body::from_stream(event_lines(events));

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        body,
    )
        .into_response())
}

/// Serialize each event as one newline-terminated JSON object.
///
/// A session error ends the body stream; the client observes the
/// connection closing.
fn event_lines(events: EventStream) -> impl Stream<Item = Result<Bytes, axum::Error>> {
    events.map(|item| match item {
        Ok(event) => {
            let mut line = serde_json::to_vec(&event).map_err(axum::Error::new)?;
            line.push(b'\n');
            Ok(Bytes::from(line))
        }
        Err(e) => {
            tracing::warn!(error = %e, "push session terminated");
            Err(axum::Error::new(e))
        }
    })
}

// =============================================================================
// Errors
// =============================================================================

/// Handler-level error, mapped onto an HTTP status and JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Snapshot store failure.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// ksqlDB failure.
    #[error(transparent)]
    Ksql(#[from] KsqlError),
}

impl ApiError {
    /// Status code for this error: upstream trouble is a gateway problem.
    const fn status(&self) -> StatusCode {
        match self {
            Self::Snapshot(_)
            | Self::Ksql(KsqlError::UpstreamUnavailable(_) | KsqlError::UpstreamStatus { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Ksql(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(status = %status, error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// =============================================================================
// Server Lifecycle
// =============================================================================

/// Client-facing HTTP server.
pub struct ApiServer {
    port: u16,
    state: AppState,
    cancel: CancellationToken,
}

impl ApiServer {
    /// Create a new API server.
    #[must_use]
    pub const fn new(port: u16, state: AppState, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or the HTTP server encounters
    /// a fatal error while running.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = create_router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Location API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Location API stopped");
        Ok(())
    }
}

/// API server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
