// crates/hub-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Shared fixtures for hub-core integration tests.
// Purpose: Provide scripted collaborators, clocks, and sample rows.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use hub_core::BearerToken;
use hub_core::Clock;
use hub_core::InMemorySnapshotStore;
use hub_core::ListSourceError;
use hub_core::SessionProvider;
use hub_core::SnapshotStore;
use hub_core::StoreError;
use hub_core::StoredSnapshot;
use hub_core::WidgetListSource;
use hub_core::WidgetRow;
use hub_core::WidgetSnapshotCache;
use serde_json::Value;
use serde_json::json;

/// Base timestamp used by test clocks.
pub const BASE_MS: i64 = 1_760_000_000_000;

/// Manually advanced clock.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now),
        })
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Session provider returning a fixed token.
pub struct FixedSession(pub Option<&'static str>);

#[async_trait]
impl SessionProvider for FixedSession {
    async fn bearer_token(&self) -> Option<BearerToken> {
        self.0.and_then(BearerToken::new)
    }
}

/// List source returning a scripted outcome and counting calls.
pub struct ScriptedSource {
    outcome: Mutex<Result<Vec<WidgetRow>, ListSourceError>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn ok(rows: Vec<WidgetRow>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Ok(rows)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: ListSourceError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Err(error)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, outcome: Result<Vec<WidgetRow>, ListSourceError>) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WidgetListSource for ScriptedSource {
    async fn fetch_list(&self, _token: &BearerToken) -> Result<Vec<WidgetRow>, ListSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.lock().unwrap().clone()
    }
}

/// Store wrapper counting saves.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemorySnapshotStore,
    saves: AtomicUsize,
}

impl CountingStore {
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for CountingStore {
    fn load(&self, key: &str, now_ms: i64) -> Result<Option<StoredSnapshot>, StoreError> {
        self.inner.load(key, now_ms)
    }

    fn save(&self, key: &str, snapshot: &StoredSnapshot) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(key, snapshot)
    }
}

/// Store that fails every operation.
pub struct FailingStore;

impl SnapshotStore for FailingStore {
    fn load(&self, _key: &str, _now_ms: i64) -> Result<Option<StoredSnapshot>, StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }

    fn save(&self, _key: &str, _snapshot: &StoredSnapshot) -> Result<(), StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }
}

/// Builds a cache over `store` with a manual clock.
pub fn cache_with(store: Arc<dyn SnapshotStore>, clock: Arc<ManualClock>) -> WidgetSnapshotCache {
    WidgetSnapshotCache::new(store).with_clock(clock)
}

/// Builds a widget row from JSON parts.
pub fn row(id: &str, kind: &str, settings: Value) -> WidgetRow {
    serde_json::from_value(json!({
        "id": id,
        "instanceId": format!("inst-{id}"),
        "kind": kind,
        "title": format!("Widget {id}"),
        "grid": { "x": 0, "y": 0, "w": 2, "h": 2 },
        "settings": settings,
    }))
    .unwrap()
}

/// Three rows of different kinds.
pub fn three_rows() -> Vec<WidgetRow> {
    vec![
        row("w1", "server-pings", json!({ "targets": ["https://a.example/health"] })),
        row("w2", "pi-health", json!({ "deviceId": "pi-1" })),
        row("w3", "countdown", json!({ "source": "provider", "provider": "dnb-supertilbud" })),
    ]
}
