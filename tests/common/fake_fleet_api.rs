//! Fake fleet cloud API server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves the two endpoints the dashboard talks to:
//! - `GET /v1/fleet/machines` — location groups, filtered by `fragment_id`
//! - `POST /v1/data/query` — aggregation over seeded scan records
//!
//! Both endpoints require `Authorization: Bearer <token>` and answer 401
//! otherwise. The query endpoint interprets the same three pipeline stages
//! the dashboard sends (`$match` with `robot_id` equality and
//! `time_requested.$gte`, `$sort` on `time_requested`, `$limit`), so a
//! harness seeds records once and exercises both views against realistic
//! responses. Records are seeded and served as raw JSON documents: the fake
//! speaks the wire format, not the crate's types.
//!
//! # Example
//!
//! ```rust,no_run
//! # tokio_test::block_on(async {
//! use common::fake_fleet_api::FakeFleetApi;
//!
//! let api = FakeFleetApi::start().await.unwrap();
//! api.add_location_group("frag-1", serde_json::json!({
//!     "location_id": "loc-1",
//!     "organization_id": "org-1",
//!     "organization_name": "Acme Stores",
//!     "machines": [{ "machine_id": "robot-1", "machine_name": "Rover" }],
//! }))
//! .await;
//!
//! // Point your FleetClient at api.base_url()
//! let url = api.base_url();
//! # });
//! ```

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// State shared between the router and test code.
#[derive(Default)]
struct ApiState {
    expected_token: String,
    /// fragment_id → location group documents served by /v1/fleet/machines.
    fragments: HashMap<String, Vec<serde_json::Value>>,
    /// organization_id → scan record documents served by /v1/data/query.
    scans: HashMap<String, Vec<serde_json::Value>>,
    /// Artificial delay applied to every query response.
    query_latency: Duration,
    /// When set, every query answers with this status instead of data.
    query_failure: Option<u16>,
}

/// Handle to the running fake fleet API server.
pub struct FakeFleetApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeFleetApi {
    /// Bearer token the fake accepts until [`FakeFleetApi::set_token`]
    /// changes it.
    pub const TOKEN: &'static str = "test-token";

    /// Start the fake fleet API server on a random port. Returns once the
    /// server is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState {
            expected_token: Self::TOKEN.to_string(),
            ..ApiState::default()
        }));

        let app = Router::new()
            .route("/v1/fleet/machines", get(list_machines))
            .route("/v1/data/query", post(run_query))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the task a moment to register.
        tokio::time::sleep(Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Register a location group document under a fragment.
    pub async fn add_location_group(&self, fragment_id: &str, group: serde_json::Value) {
        let mut state = self.state.lock().await;
        state
            .fragments
            .entry(fragment_id.to_string())
            .or_default()
            .push(group);
    }

    /// Seed one scan record document under an organisation.
    pub async fn add_scan(&self, organization_id: &str, scan: serde_json::Value) {
        let mut state = self.state.lock().await;
        state
            .scans
            .entry(organization_id.to_string())
            .or_default()
            .push(scan);
    }

    /// Change the bearer token the fake accepts.
    pub async fn set_token(&self, token: &str) {
        self.state.lock().await.expected_token = token.to_string();
    }

    /// Delay every query response, so a harness can race a second request
    /// against an in-flight one.
    pub async fn set_query_latency(&self, latency: Duration) {
        self.state.lock().await.query_latency = latency;
    }

    /// Make every query answer with `status` instead of data.
    pub async fn fail_queries_with(&self, status: u16) {
        self.state.lock().await.query_failure = Some(status);
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct QueryBody {
    organization_id: String,
    stages: Vec<serde_json::Value>,
}

async fn list_machines(
    State(state): State<Arc<Mutex<ApiState>>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<serde_json::Value>) {
    let state = state.lock().await;
    if let Err(code) = check_bearer(&headers, &state.expected_token) {
        return (code, Json(serde_json::json!({ "error": "unauthorized" })));
    }

    let fragment_id = params.get("fragment_id").map(String::as_str).unwrap_or("");
    let groups = state.fragments.get(fragment_id).cloned().unwrap_or_default();
    (StatusCode::OK, Json(serde_json::Value::Array(groups)))
}

async fn run_query(
    State(state): State<Arc<Mutex<ApiState>>>,
    headers: HeaderMap,
    Json(body): Json<QueryBody>,
) -> (StatusCode, Json<serde_json::Value>) {
    // Read everything under the lock, then release it: a slow response must
    // not block a concurrent newer request.
    let (latency, records) = {
        let state = state.lock().await;
        if let Err(code) = check_bearer(&headers, &state.expected_token) {
            return (code, Json(serde_json::json!({ "error": "unauthorized" })));
        }
        if let Some(status) = state.query_failure {
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (code, Json(serde_json::json!({ "error": "upstream failure" })));
        }
        let records = state
            .scans
            .get(&body.organization_id)
            .cloned()
            .unwrap_or_default();
        (state.query_latency, records)
    };

    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }

    let mut records = records;
    for stage in &body.stages {
        records = apply_stage(stage, records);
    }
    (StatusCode::OK, Json(serde_json::Value::Array(records)))
}

fn check_bearer(headers: &HeaderMap, expected: &str) -> Result<(), StatusCode> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if value == format!("Bearer {expected}") {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

// ---------------------------------------------------------------------------
// Pipeline interpretation
// ---------------------------------------------------------------------------

/// Interpret one pipeline stage over the record set. Supports exactly the
/// stage shapes the dashboard sends; unknown stages pass records through.
fn apply_stage(
    stage: &serde_json::Value,
    mut records: Vec<serde_json::Value>,
) -> Vec<serde_json::Value> {
    if let Some(filter) = stage.get("$match") {
        records.retain(|record| matches_filter(record, filter));
    } else if let Some(keys) = stage.get("$sort") {
        if keys.get("time_requested").and_then(|v| v.as_i64()) == Some(-1) {
            records.sort_by_key(|record| std::cmp::Reverse(record_time(record)));
        }
    } else if let Some(limit) = stage.get("$limit").and_then(|v| v.as_u64()) {
        records.truncate(limit as usize);
    }
    records
}

fn matches_filter(record: &serde_json::Value, filter: &serde_json::Value) -> bool {
    let Some(conditions) = filter.as_object() else {
        return true;
    };
    conditions.iter().all(|(key, condition)| match condition {
        serde_json::Value::Object(ops) => ops.iter().all(|(op, bound)| match op.as_str() {
            "$gte" => match (record.get(key).and_then(parse_time), parse_time(bound)) {
                (Some(field), Some(bound)) => field >= bound,
                _ => false,
            },
            // Operators the dashboard never sends pass everything.
            _ => true,
        }),
        expected => record.get(key) == Some(expected),
    })
}

fn parse_time(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn record_time(record: &serde_json::Value) -> DateTime<Utc> {
    record
        .get("time_requested")
        .and_then(parse_time)
        .unwrap_or_default()
}
