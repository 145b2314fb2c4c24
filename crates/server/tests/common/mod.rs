//! Common test utilities for the service simulator.
//!
//! [`TestFixture`] drives the router in-process with `oneshot`;
//! [`spawn_server`] serves it on an ephemeral TCP port for tests that need a
//! real HTTP client.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use vidwarn_core::{Item, ItemCatalog, MemoryCatalog, OperationProfile, SimulatorConfig};
use vidwarn_server::{create_router, AppState};

/// Re-export fixtures for test convenience
pub use vidwarn_core::testing::fixtures;

/// Simulator settings with no artificial latency.
pub fn instant_simulator() -> SimulatorConfig {
    SimulatorConfig {
        list_delay_ms: 0,
        metadata: OperationProfile::new(10, 0, 0, 10),
        transcript: OperationProfile::new(20, 0, 0, 10),
        update: OperationProfile::new(50, 0, 0, 10),
        ..Default::default()
    }
}

/// Test fixture around an in-process simulator router.
pub struct TestFixture {
    pub router: Router,
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    /// Body parsed as JSON, `Null` if it is not JSON.
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Fixture over the given items with no artificial latency.
    pub fn new(items: Vec<Item>) -> Self {
        Self::with_config(items, instant_simulator())
    }

    pub fn with_config(items: Vec<Item>, config: SimulatorConfig) -> Self {
        let catalog: Arc<dyn ItemCatalog> = Arc::new(MemoryCatalog::from_items(items));
        let state = Arc::new(AppState::new(config, catalog));
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn ItemCatalog> {
        self.state.catalog()
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body)).await
    }

    /// Send a request to the test router.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            content_type,
            body,
            text,
        }
    }
}

/// Serve the simulator on an ephemeral local port.
pub async fn spawn_server(state: Arc<AppState>) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    let app = create_router(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });
    (addr, handle)
}
