//! Redis Snapshot Store
//!
//! [`SnapshotStore`] adapter over Redis. The ingest pipeline keeps one key
//! per vehicle holding its latest position, so a snapshot is a key scan
//! followed by a bulk get. Connection parameters come from configuration;
//! nothing is hardcoded.

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::application::ports::{SnapshotError, SnapshotStore};
use crate::domain::location::VehicleLocation;
use crate::infrastructure::config::RedisSettings;

/// Snapshot store backed by a Redis database.
#[derive(Clone)]
pub struct RedisSnapshotStore {
    client: redis::Client,
}

impl RedisSnapshotStore {
    /// Create a store from connection settings.
    ///
    /// The URL is validated here; the connection itself is established
    /// lazily per request.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Unavailable` if the URL cannot be parsed.
    pub fn new(settings: &RedisSettings) -> Result<Self, SnapshotError> {
        let client = redis::Client::open(settings.url.as_str())
            .map_err(|e| SnapshotError::Unavailable(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn latest_locations(&self) -> Result<Vec<VehicleLocation>, SnapshotError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| SnapshotError::Unavailable(e.to_string()))?;

        let keys: Vec<String> = conn
            .keys("*")
            .await
            .map_err(|e| SnapshotError::Command(e.to_string()))?;

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = conn
            .mget(&keys)
            .await
            .map_err(|e| SnapshotError::Command(e.to_string()))?;

        let locations = keys
            .into_iter()
            .zip(values)
            .filter_map(|(veh_id, loc)| {
                // A key deleted between KEYS and MGET has no value; skip it.
                loc.map(|loc| VehicleLocation::new(veh_id, loc))
            })
            .collect();

        Ok(locations)
    }
}
