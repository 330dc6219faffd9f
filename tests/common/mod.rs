//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use dashboard_routes::config::DashboardConfig;
use dashboard_routes::http::HttpServer;
use dashboard_routes::lifecycle::Shutdown;

/// A mock LAPIS instance that records every request body it receives.
pub struct MockLapis {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl MockLapis {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// Start a mock LAPIS answering `/sample/aggregated` with `status`.
///
/// Successful responses carry one row per request: `count` is the number of
/// filter keys received and each requested field is echoed as `"<field>-value"`.
pub async fn start_mock_lapis(status: u16) -> MockLapis {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status: StatusCode::from_u16(status).unwrap(),
        requests: requests.clone(),
    };

    let app = Router::new()
        .route("/sample/aggregated", post(aggregated))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockLapis { addr, requests }
}

async fn aggregated(State(state): State<MockState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(body.clone());

    if !state.status.is_success() {
        return (state.status, Json(json!({ "error": { "detail": "mock failure" } })));
    }

    let filter_keys = body.as_object().map_or(0, |m| m.keys().filter(|k| k.as_str() != "fields").count());
    let mut row = json!({ "count": filter_keys });
    if let Some(fields) = body.get("fields").and_then(Value::as_array) {
        for field in fields.iter().filter_map(Value::as_str) {
            row[field] = json!(format!("{}-value", field));
        }
    }
    (StatusCode::OK, Json(json!({ "data": [row], "info": {} })))
}

/// Default config with every organism pointed at `lapis_url`.
pub fn config_with_lapis(lapis_url: &str) -> DashboardConfig {
    let mut config = DashboardConfig::default();
    for organism in &mut config.organisms {
        organism.lapis_url = lapis_url.to_string();
    }
    config
}

/// Run the dashboard API on an ephemeral port.
pub async fn start_server(config: DashboardConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (_, updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(server.run(listener, updates, shutdown.subscribe()));

    (addr, shutdown)
}
