//! ksqlDB REST Client
//!
//! Wraps a shared `reqwest::Client` for the two query endpoints:
//!
//! - `POST /query` for the one-shot pull query over the current-position
//!   table
//! - `POST /query-stream` for the continuous push query, handed off to a
//!   [`PushSession`] as a chunked byte stream
//!
//! No retry is performed here; a failed call surfaces immediately and the
//! caller decides whether to issue a fresh one.

use reqwest::header;
use serde_json::json;

use super::frames::PullElement;
use super::relay::{EventStream, PushSession};
use crate::domain::location::VehicleLocation;
use crate::infrastructure::config::KsqlSettings;

/// Pull query over the current-position table.
const PULL_QUERY: &str = "select * from bus_current;";

/// Continuous variant of the same query.
const PUSH_QUERY: &str = "select * from bus_current emit changes;";

/// Accept header for the v1 pull query endpoint.
const KSQL_V1_JSON: &str = "application/vnd.ksql.v1+json";

/// ksqlDB client errors.
#[derive(Debug, thiserror::Error)]
pub enum KsqlError {
    /// Failed to construct the underlying HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The upstream could not be reached.
    #[error("ksqlDB unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream answered with a non-success status.
    #[error("ksqlDB returned HTTP {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The pull query response did not have the expected shape.
    #[error("invalid query response: {0}")]
    InvalidResponse(String),
}

/// Client for the ksqlDB REST API.
#[derive(Debug, Clone)]
pub struct KsqlClient {
    client: reqwest::Client,
    base_url: String,
    idle_timeout: std::time::Duration,
}

impl KsqlClient {
    /// Create a client from connection settings.
    ///
    /// No overall request timeout is set: push query responses are
    /// unbounded by design. Idle detection happens per-session in the
    /// relay instead.
    ///
    /// # Errors
    ///
    /// Returns `KsqlError::ClientBuild` if the HTTP client cannot be
    /// constructed.
    pub fn new(settings: &KsqlSettings) -> Result<Self, KsqlError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| KsqlError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            idle_timeout: settings.idle_timeout,
        })
    }

    /// Run the one-shot pull query and collect every row.
    ///
    /// The response is a JSON array whose first element is a header object;
    /// elements carrying a `row` field map one-to-one onto locations.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` when the request cannot be sent,
    /// `UpstreamStatus` on a non-success response, and `InvalidResponse`
    /// when the body or a row does not have the expected shape.
    pub async fn pull_current_locations(&self) -> Result<Vec<VehicleLocation>, KsqlError> {
        let url = format!("{}/query", self.base_url);
        let body = json!({
            "ksql": PULL_QUERY,
            "streamsProperties": {},
        });

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, KSQL_V1_JSON)
            .json(&body)
            .send()
            .await
            .map_err(|e| KsqlError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KsqlError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let elements: Vec<PullElement> = response
            .json()
            .await
            .map_err(|e| KsqlError::InvalidResponse(e.to_string()))?;

        let mut locations = Vec::with_capacity(elements.len().saturating_sub(1));
        for element in elements {
            let Some(row) = element.row else {
                // Header or trailer element.
                continue;
            };
            let location = VehicleLocation::from_columns(&row.columns).ok_or_else(|| {
                KsqlError::InvalidResponse(format!(
                    "row has {} columns, expected at least 2",
                    row.columns.len()
                ))
            })?;
            locations.push(location);
        }

        tracing::debug!(rows = locations.len(), "pull query completed");
        Ok(locations)
    }

    /// Open the continuous push query and return its event stream.
    ///
    /// Each call opens a fresh upstream connection and a fresh session; the
    /// stream is single-pass and not restartable. Dropping it closes the
    /// upstream connection.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` when the connection cannot be opened
    /// and `UpstreamStatus` when the upstream rejects the query; decode
    /// failures after streaming begins surface as items on the stream.
    pub async fn push_current_locations(&self) -> Result<EventStream, KsqlError> {
        let url = format!("{}/query-stream", self.base_url);
        let body = json!({
            "sql": PUSH_QUERY,
            "streamsProperties": {},
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| KsqlError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KsqlError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(url = %url, "push query stream opened");

        let chunks = Box::pin(response.bytes_stream());
        let session = PushSession::new(chunks, self.idle_timeout);
        Ok(Box::pin(session.into_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_url: &str) -> KsqlSettings {
        KsqlSettings {
            base_url: base_url.to_string(),
            ..KsqlSettings::default()
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = KsqlClient::new(&settings("http://ksqldb:8088/")).unwrap();
        assert_eq!(client.base_url, "http://ksqldb:8088");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_unavailable() {
        // Reserved TEST-NET-1 address; connection refused or timed out.
        let mut s = settings("http://192.0.2.1:1");
        s.connect_timeout = std::time::Duration::from_millis(100);
        let client = KsqlClient::new(&s).unwrap();

        let result = client.pull_current_locations().await;
        assert!(matches!(result, Err(KsqlError::UpstreamUnavailable(_))));
    }
}
