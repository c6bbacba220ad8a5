// crates/hub-providers/tests/common/mod.rs
// ============================================================================
// Module: Provider Test Helpers
// Description: In-process backend server and scripted fetchers.
// Purpose: Exercise HTTP collaborators and pollers without a real backend.
// Dependencies: hub-core, hub-providers, axum, tokio
// ============================================================================

//! ## Overview
//! The mock backend answers scripted responses per route and records every
//! request it sees. Scripted and gated fetchers drive pollers without any
//! network traffic.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use hub_core::FetchError;
use hub_core::InstanceId;
use hub_core::KindData;
use hub_core::KindFetcher;
use hub_core::Widget;
use hub_core::WidgetKind;
use hub_core::WidgetRow;
use hub_providers::BackendClient;
use hub_providers::BackendClientConfig;
use serde_json::Value;
use serde_json::json;
use tokio::sync::Notify;
use tokio::sync::oneshot;
use url::Url;

// ============================================================================
// SECTION: Mock Backend
// ============================================================================

/// Canned response for one route.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl Scripted {
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Request as observed by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

/// Backend answering scripted responses keyed by `"<METHOD> <path>"`.
#[derive(Default)]
pub struct MockBackend {
    responses: Mutex<BTreeMap<String, Scripted>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, method: &str, path: &str, response: Scripted) {
        self.responses.lock().unwrap().insert(format!("{method} {path}"), response);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<Recorded> {
        self.requests.lock().unwrap().last().cloned()
    }
}

async fn handle(
    State(backend): State<Arc<MockBackend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let key = format!("{} {}", method, uri.path());
    backend.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    });
    let scripted = backend.responses.lock().unwrap().get(&key).cloned();
    let scripted = scripted.unwrap_or_else(|| Scripted::json(StatusCode::NOT_FOUND, &json!({})));
    if !scripted.delay.is_zero() {
        tokio::time::sleep(scripted.delay).await;
    }
    (scripted.status, [(CONTENT_TYPE, "application/json")], scripted.body)
}

/// Serves `backend` on an ephemeral port.
pub async fn spawn_backend(backend: Arc<MockBackend>) -> (String, oneshot::Sender<()>) {
    let app = Router::new().fallback(handle).with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
    });
    (format!("http://{addr}"), shutdown_tx)
}

/// Builds a backend client for `base_url`.
pub fn backend_client(base_url: &str, max_response_bytes: usize) -> BackendClient {
    BackendClient::new(&BackendClientConfig {
        base_url: Url::parse(base_url).expect("base url"),
        connect_timeout: Duration::from_millis(500),
        user_agent: "widget-hub-tests".to_string(),
        max_response_bytes,
    })
    .expect("client")
}

/// Returns a base URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

// ============================================================================
// SECTION: Widgets
// ============================================================================

/// Builds a list row JSON value.
pub fn row_json(instance: &str, kind: &str) -> Value {
    json!({
        "id": format!("id-{instance}"),
        "instanceId": instance,
        "kind": kind,
        "title": format!("Widget {instance}"),
        "grid": { "x": 0, "y": 0, "w": 2, "h": 1 },
        "settings": {},
    })
}

/// Builds a typed widget.
pub fn widget(instance: &str, kind: &str) -> Widget {
    let row: WidgetRow = serde_json::from_value(row_json(instance, kind)).expect("row");
    Widget::from_row(&row)
}

/// Countdown data fixture.
pub fn countdown_data(next: &str) -> KindData {
    KindData::decode(
        WidgetKind::Countdown,
        json!({ "nowIso": "2026-10-18T08:00:00Z", "nextIso": next, "ongoing": false }),
    )
    .expect("countdown data")
}

// ============================================================================
// SECTION: Fetchers
// ============================================================================

/// Fetcher replaying scripted outcomes; the last one repeats.
pub struct ScriptedFetcher {
    outcomes: Mutex<VecDeque<Result<KindData, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(outcomes: Vec<Result<KindData, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KindFetcher for ScriptedFetcher {
    async fn fetch(&self, _instance_id: &InstanceId) -> Result<KindData, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            outcomes.front().cloned().unwrap()
        }
    }
}

/// Fetcher that blocks until released, then succeeds.
pub struct GatedFetcher {
    gate: Notify,
    data: KindData,
    calls: AtomicUsize,
}

impl GatedFetcher {
    pub fn new(data: KindData) -> Arc<Self> {
        Arc::new(Self {
            gate: Notify::new(),
            data,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KindFetcher for GatedFetcher {
    async fn fetch(&self, _instance_id: &InstanceId) -> Result<KindData, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.data.clone())
    }
}
