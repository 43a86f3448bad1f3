//! Push Relay Integration Tests
//!
//! Exercises the ksqlDB client and the HTTP surface end to end against a
//! mock upstream server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::StreamExt;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use location_api::{
    AppState, KsqlClient, KsqlError, KsqlSettings, RelayError, SnapshotError, SnapshotStore,
    VehicleLocation, create_router,
};

const PUSH_HEADER: &str = r#"{"queryId":"q1","columnNames":["VEH_ID","POSITION","TS"],"columnTypes":["INTEGER","STRING","BIGINT"]}"#;

const DELIMITED_CONTENT_TYPE: &str = "application/vnd.ksqlapi.delimited.v1";

fn client_for(server: &MockServer) -> KsqlClient {
    let settings = KsqlSettings {
        base_url: server.uri(),
        idle_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
    };
    KsqlClient::new(&settings).unwrap()
}

async fn mount_push_body(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/query-stream"))
        .and(body_partial_json(
            json!({"sql": "select * from bus_current emit changes;"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, DELIMITED_CONTENT_TYPE))
        .mount(server)
        .await;
}

async fn collect_events(client: &KsqlClient) -> (Vec<VehicleLocation>, Option<RelayError>) {
    let mut stream = client.push_current_locations().await.unwrap();
    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => events.push(event),
            Err(e) => return (events, Some(e)),
        }
    }
    (events, None)
}

struct EmptyStore;

#[async_trait::async_trait]
impl SnapshotStore for EmptyStore {
    async fn latest_locations(&self) -> Result<Vec<VehicleLocation>, SnapshotError> {
        Ok(Vec::new())
    }
}

fn state_for(server: &MockServer) -> AppState {
    AppState {
        snapshots: Arc::new(EmptyStore),
        ksql: Arc::new(client_for(server)),
    }
}

#[tokio::test]
async fn push_query_relays_events_in_order() {
    let server = MockServer::start().await;
    mount_push_body(
        &server,
        format!("{PUSH_HEADER}\n[42,\"loc-A\",1000]\n[7,\"loc-B\",1001]\n"),
    )
    .await;

    let client = client_for(&server);
    let (events, error) = collect_events(&client).await;

    assert!(error.is_none());
    assert_eq!(
        events,
        vec![
            VehicleLocation::new(42, "loc-A"),
            VehicleLocation::new(7, "loc-B"),
        ]
    );
}

#[tokio::test]
async fn push_query_fails_cleanly_on_truncated_frame() {
    let server = MockServer::start().await;
    mount_push_body(
        &server,
        format!("{PUSH_HEADER}\n[42,\"loc-A\",1000]\n[7,\"loc-B\",1001]\n[5,\"loc-C"),
    )
    .await;

    let client = client_for(&server);
    let (events, error) = collect_events(&client).await;

    assert_eq!(events.len(), 2);
    assert!(matches!(error, Some(RelayError::MalformedFrame(_))));
}

#[tokio::test]
async fn push_query_rejected_by_upstream_is_an_error() {
    // No mock mounted: the server answers 404.
    let server = MockServer::start().await;
    let client = client_for(&server);

    let result = client.push_current_locations().await;
    assert!(matches!(
        result,
        Err(KsqlError::UpstreamStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn pull_query_maps_rows_and_skips_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(
            json!({"ksql": "select * from bus_current;"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"header": {"queryId": "q2", "schema": "`VEH_ID` INTEGER"}},
            {"row": {"columns": [2, "loc-B", 1001]}},
            {"row": {"columns": [1, "loc-A", 1000]}},
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let locations = client.pull_current_locations().await.unwrap();

    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0], VehicleLocation::new(2, "loc-B"));
}

#[tokio::test]
async fn pull_query_surfaces_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("engine exploded"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.pull_current_locations().await;

    assert!(matches!(
        result,
        Err(KsqlError::UpstreamStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn ksqldb_endpoint_returns_sorted_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"header": {"queryId": "q2"}},
            {"row": {"columns": [2, "loc-B", 1001]}},
            {"row": {"columns": [1, "loc-A", 1000]}},
        ])))
        .mount(&server)
        .await;

    let app = create_router(state_for(&server));
    let response = app
        .oneshot(Request::get("/ksqldb").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["size"], 2);
    assert_eq!(body["data"][0]["veh_id"], 1);
    assert_eq!(body["data"][1]["veh_id"], 2);
}

#[tokio::test]
async fn ksqldb_endpoint_maps_upstream_failure_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = create_router(state_for(&server));
    let response = app
        .oneshot(Request::get("/ksqldb").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn push_endpoint_streams_one_json_line_per_event() {
    let server = MockServer::start().await;
    mount_push_body(
        &server,
        format!("{PUSH_HEADER}\n[42,\"loc-A\",1000]\n[7,\"loc-B\",1001]\n"),
    )
    .await;

    let app = create_router(state_for(&server));
    let response = app
        .oneshot(Request::get("/ksqldb-push").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/x-ndjson")
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(
        body,
        "{\"veh_id\":42,\"loc\":\"loc-A\"}\n{\"veh_id\":7,\"loc\":\"loc-B\"}\n"
    );
}
