// crates/hub-core/tests/resolver.rs
// ============================================================================
// Module: Widget List Resolver Tests
// Description: Fresh, stale, offline, and failed resolution outcomes.
// Purpose: Ensure every outcome is one of the four legal result shapes.
// Dependencies: hub-core, tokio
// ============================================================================

//! ## Overview
//! Drives [`WidgetListResolver`] with scripted list sources and sessions,
//! checking the fallback path against an in-memory snapshot store.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;

use hub_core::InMemorySnapshotStore;
use hub_core::KindTag;
use hub_core::ListResolution;
use hub_core::ListSourceError;
use hub_core::LogLevel;
use hub_core::MemoryLogSink;
use hub_core::OwnerId;
use hub_core::WidgetKind;
use hub_core::WidgetListResolver;
use hub_core::WidgetRow;
use hub_core::WidgetSettings;
use serde_json::json;

use crate::common::BASE_MS;
use crate::common::FixedSession;
use crate::common::ManualClock;
use crate::common::ScriptedSource;
use crate::common::cache_with;
use crate::common::row;
use crate::common::three_rows;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn timeout() -> ListSourceError {
    ListSourceError::Timeout("no response within 3000 ms".to_string())
}

fn resolver(
    source: Arc<ScriptedSource>,
    store: Arc<InMemorySnapshotStore>,
    clock: Arc<ManualClock>,
) -> WidgetListResolver {
    WidgetListResolver::new(source, Arc::new(FixedSession(Some("token"))), cache_with(store, clock))
}

/// Asserts the resolution matches exactly one legal flat shape.
fn assert_legal_shape(resolution: &ListResolution) {
    let widgets_empty = resolution.widgets().is_empty();
    let error = resolution.error();
    let stale = resolution.is_stale();
    let offline = resolution.is_offline();
    let shapes = [
        error.is_none() && !stale && !offline && resolution.rows().is_some(),
        error.is_some() && stale && !widgets_empty && resolution.rows().is_none(),
        error.is_some() && !stale && offline && widgets_empty,
        error.is_some() && !stale && !offline && widgets_empty,
    ];
    assert_eq!(shapes.iter().filter(|matched| **matched).count(), 1, "{resolution:?}");
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies a successful fetch yields typed widgets plus raw rows.
#[tokio::test]
async fn fresh_success_returns_widgets_and_rows() {
    let rows = three_rows();
    let source = ScriptedSource::ok(rows.clone());
    let resolver =
        resolver(source.clone(), Arc::new(InMemorySnapshotStore::new()), ManualClock::new(BASE_MS));
    let resolution = resolver.resolve(Some(&OwnerId::new("user-1"))).await;
    assert_legal_shape(&resolution);
    assert_eq!(resolution.rows(), Some(rows.as_slice()));
    assert_eq!(resolution.widgets().len(), 3);
    assert!(!resolution.is_stale());
    assert_eq!(source.calls(), 1);
}

/// Verifies an empty list is still a fresh success.
#[tokio::test]
async fn fresh_empty_list_is_success() {
    let resolver = resolver(
        ScriptedSource::ok(Vec::new()),
        Arc::new(InMemorySnapshotStore::new()),
        ManualClock::new(BASE_MS),
    );
    let resolution = resolver.resolve(None).await;
    assert_legal_shape(&resolution);
    assert!(resolution.error().is_none());
    assert!(resolution.widgets().is_empty());
}

/// Verifies a timeout with a two-minute-old snapshot serves stale widgets.
#[tokio::test]
async fn timeout_with_snapshot_serves_stale() {
    let store = Arc::new(InMemorySnapshotStore::new());
    let clock = ManualClock::new(BASE_MS);
    let owner = OwnerId::new("user-1");
    let slim: Vec<_> = three_rows().iter().map(WidgetRow::slim).collect();
    cache_with(store.clone(), Arc::clone(&clock)).write(&owner, &slim).unwrap();
    clock.advance(120_000);

    let resolver = resolver(ScriptedSource::failing(timeout()), store, clock);
    let resolution = resolver.resolve(Some(&owner)).await;
    assert_legal_shape(&resolution);
    assert!(resolution.is_stale());
    assert!(resolution.is_offline());
    assert_eq!(resolution.error(), Some(timeout().to_string().as_str()));
    let ids: Vec<&str> = resolution.widgets().iter().map(|widget| widget.id.as_str()).collect();
    assert_eq!(ids, vec!["w1", "w2", "w3"]);
    assert!(resolution.widgets().iter().all(|widget| widget.stale));
    assert!(resolution.rows().is_none());
}

/// Verifies cached widgets get kind defaults because settings are not cached.
#[tokio::test]
async fn stale_widgets_use_default_settings() {
    let store = Arc::new(InMemorySnapshotStore::new());
    let clock = ManualClock::new(BASE_MS);
    let owner = OwnerId::new("user-1");
    let slim: Vec<_> = three_rows().iter().map(WidgetRow::slim).collect();
    cache_with(store.clone(), Arc::clone(&clock)).write(&owner, &slim).unwrap();
    let resolver = resolver(ScriptedSource::failing(timeout()), store, clock);
    let resolution = resolver.resolve(Some(&owner)).await;
    match &resolution.widgets()[1].settings {
        WidgetSettings::PiHealth(settings) => assert_eq!(settings.device_id, ""),
        other => panic!("unexpected settings {other:?}"),
    }
}

/// Verifies a timeout without a snapshot yields the empty offline outcome.
#[tokio::test]
async fn timeout_without_snapshot_is_offline() {
    let resolver = resolver(
        ScriptedSource::failing(timeout()),
        Arc::new(InMemorySnapshotStore::new()),
        ManualClock::new(BASE_MS),
    );
    let resolution = resolver.resolve(Some(&OwnerId::new("user-1"))).await;
    assert_legal_shape(&resolution);
    assert_eq!(resolution, ListResolution::Offline {
        error: timeout().to_string(),
    });
    assert!(!resolution.is_stale());
}

/// Verifies a non-network failure without a snapshot is a hard error.
#[tokio::test]
async fn client_error_without_snapshot_is_failed() {
    let error = ListSourceError::Status {
        status: 403,
        body: "forbidden".to_string(),
    };
    let resolver = resolver(
        ScriptedSource::failing(error.clone()),
        Arc::new(InMemorySnapshotStore::new()),
        ManualClock::new(BASE_MS),
    );
    let resolution = resolver.resolve(Some(&OwnerId::new("user-1"))).await;
    assert_legal_shape(&resolution);
    assert_eq!(resolution, ListResolution::Failed {
        error: "backend returned 403 - forbidden".to_string(),
    });
}

/// Verifies a non-network failure with a snapshot is stale but not offline.
#[tokio::test]
async fn client_error_with_snapshot_is_stale_not_offline() {
    let store = Arc::new(InMemorySnapshotStore::new());
    let clock = ManualClock::new(BASE_MS);
    let owner = OwnerId::new("user-1");
    let slim: Vec<_> = three_rows().iter().map(WidgetRow::slim).collect();
    cache_with(store.clone(), Arc::clone(&clock)).write(&owner, &slim).unwrap();
    let resolver =
        resolver(ScriptedSource::failing(ListSourceError::Malformed("eof".into())), store, clock);
    let resolution = resolver.resolve(Some(&owner)).await;
    assert_legal_shape(&resolution);
    assert!(resolution.is_stale());
    assert!(!resolution.is_offline());
}

/// Verifies a missing session fails without calling the list source.
#[tokio::test]
async fn missing_session_short_circuits() {
    let source = ScriptedSource::ok(three_rows());
    let resolver = WidgetListResolver::new(
        source.clone(),
        Arc::new(FixedSession(None)),
        cache_with(Arc::new(InMemorySnapshotStore::new()), ManualClock::new(BASE_MS)),
    );
    let resolution = resolver.resolve(Some(&OwnerId::new("user-1"))).await;
    assert_legal_shape(&resolution);
    assert_eq!(source.calls(), 0);
    assert_eq!(resolution.error(), Some("no session token available"));
    assert!(!resolution.is_offline());
}

/// Verifies a failure without an owner never reads the snapshot.
#[tokio::test]
async fn failure_without_owner_skips_snapshot() {
    let store = Arc::new(InMemorySnapshotStore::new());
    let clock = ManualClock::new(BASE_MS);
    let slim: Vec<_> = three_rows().iter().map(WidgetRow::slim).collect();
    cache_with(store.clone(), Arc::clone(&clock)).write(&OwnerId::new("user-1"), &slim).unwrap();
    let resolver = resolver(ScriptedSource::failing(timeout()), store, clock);
    let resolution = resolver.resolve(None).await;
    assert_legal_shape(&resolution);
    assert!(resolution.widgets().is_empty());
}

/// Verifies untyped failures fall back to keyword classification.
#[tokio::test]
async fn untyped_errors_use_keyword_classification() {
    for (message, offline) in
        [("getaddrinfo ENOTFOUND api", true), ("Backend returned 502", true), ("nope", false)]
    {
        let resolver = resolver(
            ScriptedSource::failing(ListSourceError::Other(message.to_string())),
            Arc::new(InMemorySnapshotStore::new()),
            ManualClock::new(BASE_MS),
        );
        let resolution = resolver.resolve(None).await;
        assert_legal_shape(&resolution);
        assert_eq!(resolution.is_offline(), offline, "{message}");
        assert_eq!(resolution.error(), Some(message));
    }
}

/// Verifies every simulated outcome lands in exactly one legal shape.
#[tokio::test]
async fn outcomes_are_mutually_exclusive() {
    let errors = [
        None,
        Some(timeout()),
        Some(ListSourceError::Connect("refused".into())),
        Some(ListSourceError::Dns("no such host".into())),
        Some(ListSourceError::Status {
            status: 503,
            body: String::new(),
        }),
        Some(ListSourceError::Status {
            status: 400,
            body: String::new(),
        }),
        Some(ListSourceError::Unauthenticated),
        Some(ListSourceError::Config("missing base url".into())),
    ];
    for error in errors {
        for cached in [false, true] {
            for owner in [None, Some(OwnerId::new("user-1"))] {
                let store = Arc::new(InMemorySnapshotStore::new());
                let clock = ManualClock::new(BASE_MS);
                if cached {
                    let slim: Vec<_> = three_rows().iter().map(WidgetRow::slim).collect();
                    cache_with(store.clone(), Arc::clone(&clock))
                        .write(&OwnerId::new("user-1"), &slim)
                        .unwrap();
                }
                let source = match &error {
                    None => ScriptedSource::ok(three_rows()),
                    Some(error) => ScriptedSource::failing(error.clone()),
                };
                let resolution = resolver(source, store, clock).resolve(owner.as_ref()).await;
                assert_legal_shape(&resolution);
            }
        }
    }
}

/// Verifies malformed settings and unknown kinds never fail the list.
#[tokio::test]
async fn malformed_settings_are_narrowed() {
    let rows = vec![
        row("a", "pi-health", json!("not an object")),
        row("b", "countdown", json!({ "source": "provider", "provider": "bogus", "showHours": 1 })),
        row("c", "weather", json!({ "city": "Oslo" })),
    ];
    let resolver = resolver(
        ScriptedSource::ok(rows),
        Arc::new(InMemorySnapshotStore::new()),
        ManualClock::new(BASE_MS),
    );
    let resolution = resolver.resolve(None).await;
    let widgets = resolution.widgets();
    assert_eq!(widgets[0].kind, KindTag::Known(WidgetKind::PiHealth));
    match &widgets[1].settings {
        WidgetSettings::Countdown(settings) => {
            assert_eq!(settings.provider.as_str(), "trippel-trumf");
            assert!(settings.show_hours);
        }
        other => panic!("unexpected settings {other:?}"),
    }
    assert_eq!(widgets[2].kind, KindTag::Unknown("weather".to_string()));
    assert_eq!(widgets[2].settings, WidgetSettings::Unknown(json!({ "city": "Oslo" })));
}

/// Verifies failures are reported to the operator sink with full detail.
#[tokio::test]
async fn failures_are_logged_for_operators() {
    let sink = MemoryLogSink::new();
    let resolver = resolver(
        ScriptedSource::failing(timeout()),
        Arc::new(InMemorySnapshotStore::new()),
        ManualClock::new(BASE_MS),
    )
    .with_log_sink(Arc::new(sink.clone()));
    let _ = resolver.resolve(Some(&OwnerId::new("user-1"))).await;
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "widget_list_failed");
    assert_eq!(events[0].level, LogLevel::Warn);
    assert_eq!(events[0].owner_id.as_deref(), Some("user-1"));
    assert!(events[0].message.contains("timed out"));
}
