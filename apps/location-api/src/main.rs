//! Location API Binary
//!
//! Starts the vehicle location service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin location-api
//! ```
//!
//! # Environment Variables
//!
//! All optional:
//! - `KSQLDB_URL`: ksqlDB REST base URL (default: <http://ksqldb-server:8088>)
//! - `REDIS_URL`: Redis connection URL (default: redis://localhost:6379/1)
//! - `LOCATION_API_PORT`: HTTP listen port (default: 8000)
//! - `KSQLDB_IDLE_TIMEOUT_SECS`: push-session idle window (default: 60)
//! - `KSQLDB_CONNECT_TIMEOUT_SECS`: upstream connect timeout (default: 10)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use location_api::infrastructure::telemetry;
use location_api::{
    ApiConfig, ApiServer, AppState, KsqlClient, RedisSnapshotStore, SnapshotStore,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    telemetry::init();

    tracing::info!("Starting Location API");

    let config = ApiConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let snapshots: Arc<dyn SnapshotStore> =
        Arc::new(RedisSnapshotStore::new(&config.redis).context("invalid Redis settings")?);
    let ksql = Arc::new(KsqlClient::new(&config.ksql).context("invalid ksqlDB settings")?);

    let state = AppState { snapshots, ksql };
    let server = ApiServer::new(config.server.port, state, shutdown_token.clone());
    let mut server_handle = tokio::spawn(server.run());

    tokio::select! {
        result = &mut server_handle => {
            // Server exited on its own (e.g. bind failure).
            result??;
        }
        () = await_shutdown(shutdown_token) => {
            server_handle.await??;
        }
    }

    tracing::info!("Location API stopped");
    Ok(())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &ApiConfig) {
    tracing::info!(
        port = config.server.port,
        ksqldb_url = %config.ksql.base_url,
        idle_timeout_secs = config.ksql.idle_timeout.as_secs(),
        "Configuration loaded"
    );
}

/// Wait for a shutdown signal (SIGTERM or SIGINT), then cancel.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
