//! Port Interfaces
//!
//! Contracts that infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`SnapshotStore`]: latest-position lookup against the key-value store

use async_trait::async_trait;

use crate::domain::location::VehicleLocation;

/// Errors from a snapshot store adapter.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Could not reach the store.
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),

    /// A command against the store failed.
    #[error("snapshot store command failed: {0}")]
    Command(String),
}

/// Latest-position lookup against the key-value store.
///
/// One entry per vehicle; ordering is left to the caller.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Fetch the latest known position for every vehicle.
    async fn latest_locations(&self) -> Result<Vec<VehicleLocation>, SnapshotError>;
}
