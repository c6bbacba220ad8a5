// crates/hub-core/tests/widget_model.rs
// ============================================================================
// Module: Widget Model Tests
// Description: Settings narrowing, kind parsing, and rendering.
// Purpose: Ensure untrusted rows always produce a usable typed widget.
// Dependencies: hub-core
// ============================================================================

//! ## Overview
//! Covers per-kind settings defaults, unknown-kind degradation, data decoding,
//! and the text renderers.

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

use hub_core::CountdownProvider;
use hub_core::GroceryDealsSettings;
use hub_core::KindData;
use hub_core::KindTag;
use hub_core::ServerPingsSettings;
use hub_core::Widget;
use hub_core::WidgetKind;
use hub_core::WidgetSettings;
use hub_core::narrow_settings;
use hub_core::render;
use hub_core::render_unsupported;
use serde_json::Value;
use serde_json::json;

use crate::common::row;

// ============================================================================
// SECTION: Kinds
// ============================================================================

/// Verifies every kind label parses back to itself.
#[test]
fn kind_labels_parse() {
    for kind in WidgetKind::ALL {
        assert_eq!(WidgetKind::parse(kind.as_str()), Some(kind));
        assert_eq!(KindTag::parse(kind.as_str()), KindTag::Known(kind));
    }
    assert_eq!(KindTag::parse("Server-Pings"), KindTag::Unknown("Server-Pings".to_string()));
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Verifies server-pings keeps valid targets and drops invalid lists.
#[test]
fn server_pings_settings_narrowing() {
    let kind = KindTag::Known(WidgetKind::ServerPings);
    assert_eq!(
        narrow_settings(&kind, &json!({ "target": "https://a", "targets": ["https://b"] })),
        WidgetSettings::ServerPings(ServerPingsSettings {
            target: Some("https://a".to_string()),
            targets: Some(vec!["https://b".to_string()]),
        })
    );
    assert_eq!(
        narrow_settings(&kind, &json!({ "targets": ["https://b", 4] })),
        WidgetSettings::ServerPings(ServerPingsSettings::default())
    );
    assert_eq!(
        narrow_settings(&kind, &json!({ "target": "x", "targets": [1] })),
        WidgetSettings::ServerPings(ServerPingsSettings::default())
    );
    assert_eq!(
        narrow_settings(&kind, &json!({ "target": "x", "targets": "https://b" })),
        WidgetSettings::ServerPings(ServerPingsSettings::default())
    );
    assert_eq!(
        narrow_settings(&kind, &json!({ "target": "x" })),
        WidgetSettings::ServerPings(ServerPingsSettings {
            target: Some("x".to_string()),
            targets: None,
        })
    );
    assert_eq!(
        narrow_settings(&kind, &Value::Null),
        WidgetSettings::ServerPings(ServerPingsSettings::default())
    );
}

/// Verifies grocery-deals fields are type-checked one by one.
#[test]
fn grocery_settings_narrowing() {
    let kind = KindTag::Known(WidgetKind::GroceryDeals);
    assert_eq!(
        narrow_settings(
            &kind,
            &json!({ "query": "kaffe", "maxResults": "5", "city": "Bergen", "lat": 60.39, "lon": "x" })
        ),
        WidgetSettings::GroceryDeals(GroceryDealsSettings {
            query: "kaffe".to_string(),
            max_results: None,
            city: Some("Bergen".to_string()),
            lat: Some(60.39),
            lon: None,
        })
    );
    assert_eq!(
        narrow_settings(&kind, &json!([1, 2])),
        WidgetSettings::GroceryDeals(GroceryDealsSettings::default())
    );
}

/// Verifies countdown provider requires the provider source.
#[test]
fn countdown_settings_narrowing() {
    let kind = KindTag::Known(WidgetKind::Countdown);
    let narrowed = |value: Value| match narrow_settings(&kind, &value) {
        WidgetSettings::Countdown(settings) => settings,
        other => panic!("unexpected settings {other:?}"),
    };
    let valid = narrowed(json!({ "source": "provider", "provider": "dnb-supertilbud", "showHours": false }));
    assert_eq!(valid.provider, CountdownProvider::DnbSupertilbud);
    assert!(!valid.show_hours);
    let wrong_source = narrowed(json!({ "source": "manual", "provider": "dnb-supertilbud" }));
    assert_eq!(wrong_source.provider, CountdownProvider::TrippelTrumf);
    assert!(wrong_source.show_hours);
}

/// Verifies pi-health defaults the device id.
#[test]
fn pi_health_settings_default() {
    let widget = Widget::from_row(&row("p", "pi-health", json!({ "deviceId": 42 })));
    match &widget.settings {
        WidgetSettings::PiHealth(settings) => assert_eq!(settings.device_id, ""),
        other => panic!("unexpected settings {other:?}"),
    }
    assert_eq!(widget.widget_key(), "pi-health:inst-p");
}

/// Verifies list rows without settings deserialize with null settings.
#[test]
fn rows_without_settings_deserialize() {
    let row: hub_core::WidgetRow = serde_json::from_value(json!({
        "id": "x", "instanceId": "i-x", "kind": "cinemateket", "title": "Kino",
        "grid": { "x": 0, "y": 0, "w": 4, "h": 2 }
    }))
    .unwrap();
    assert_eq!(row.settings, Value::Null);
    assert_eq!(
        Widget::from_row(&row).settings,
        WidgetSettings::Cinemateket(hub_core::CinemateketSettings {})
    );
}

// ============================================================================
// SECTION: Data and Rendering
// ============================================================================

/// Verifies ping data decodes and renders host, path, status, and latency.
#[test]
fn server_pings_render() {
    let widget = Widget::from_row(&row("s", "server-pings", json!({})));
    let data = KindData::decode(
        WidgetKind::ServerPings,
        json!({
            "status": "ok",
            "updatedAt": "2026-01-01T10:00:00Z",
            "data": [
                { "url": "https://api.example.com/", "status": 200, "ms": 41, "checkedAt": "t" },
                { "url": "https://api.example.com/health?x=1", "status": 503, "ms": 900, "checkedAt": "t" },
                { "url": "not a url", "status": 0, "ms": 0, "checkedAt": "t" }
            ]
        }),
    )
    .unwrap();
    let view = render(&data, &widget);
    assert_eq!(view.title, "Widget s");
    assert_eq!(view.lines, vec![
        "Updated 2026-01-01T10:00:00Z".to_string(),
        "api.example.com 200 41 ms".to_string(),
        "api.example.com/health?x=1 503 900 ms".to_string(),
        "not a url 0 0 ms".to_string(),
    ]);
}

/// Verifies grocery rendering honors the max results setting.
#[test]
fn grocery_render_limits_results() {
    let widget = Widget::from_row(&row("g", "grocery-deals", json!({ "query": "ost", "maxResults": 1 })));
    let data = KindData::decode(
        WidgetKind::GroceryDeals,
        json!({
            "deals": [
                { "name": "Norvegia", "store": "Kiwi", "price": 89.9, "unitPrice": 179.8, "unit": "kg" },
                { "name": "Jarlsberg", "store": "Rema", "price": 99.0 }
            ],
            "isEnriched": true
        }),
    )
    .unwrap();
    let view = render(&data, &widget);
    assert_eq!(view.lines, vec!["Norvegia @ Kiwi: 89.90 kr (179.80 kr/kg)".to_string()]);
}

/// Verifies countdown rendering uses the provider label.
#[test]
fn countdown_render() {
    let widget = Widget::from_row(&row(
        "c",
        "countdown",
        json!({ "source": "provider", "provider": "dnb-supertilbud" }),
    ));
    let upcoming = KindData::decode(
        WidgetKind::Countdown,
        json!({ "nowIso": "2026-01-01T00:00:00Z", "nextIso": "2026-02-01T00:00:00Z", "ongoing": false }),
    )
    .unwrap();
    assert_eq!(render(&upcoming, &widget).lines, vec![
        "DNB Supertilbud: next 2026-02-01T00:00:00Z".to_string()
    ]);
    let ongoing = KindData::decode(
        WidgetKind::Countdown,
        json!({ "nowIso": "2026-01-01T00:00:00Z", "ongoing": true }),
    )
    .unwrap();
    assert_eq!(render(&ongoing, &widget).lines, vec!["DNB Supertilbud: ongoing".to_string()]);
}

/// Verifies cinemateket payloads are bare arrays.
#[test]
fn cinemateket_render() {
    let widget = Widget::from_row(&row("k", "cinemateket", json!(null)));
    let data = KindData::decode(
        WidgetKind::Cinemateket,
        json!([
            { "title": "Stalker", "director": "Tarkovsky", "year": 1979, "showTime": "2026-01-02T19:00" },
            { "title": "Unknown", "showTime": "2026-01-03T19:00" }
        ]),
    )
    .unwrap();
    assert_eq!(data.kind(), WidgetKind::Cinemateket);
    assert_eq!(render(&data, &widget).lines, vec![
        "2026-01-02T19:00 Stalker (1979)".to_string(),
        "2026-01-03T19:00 Unknown".to_string(),
    ]);
}

/// Verifies pi-health rendering filters by the configured device.
#[test]
fn pi_health_render_filters_device() {
    let widget = Widget::from_row(&row("p", "pi-health", json!({ "deviceId": "pi-2" })));
    let data = KindData::decode(
        WidgetKind::PiHealth,
        json!({
            "status": "ok",
            "data": [
                { "deviceId": "pi-1", "name": "kitchen", "lastSeen": null, "snapshot": null, "ts": null },
                { "deviceId": "pi-2", "name": "garage", "lastSeen": "2026-01-01T00:00:00Z",
                  "snapshot": { "cpuTempC": 48.3, "cpuPct": 12 }, "ts": null }
            ],
            "updatedAt": "2026-01-01T00:00:00Z"
        }),
    )
    .unwrap();
    assert_eq!(render(&data, &widget).lines, vec![
        "garage (last seen 2026-01-01T00:00:00Z) 48.3C, 12.0% cpu".to_string()
    ]);
}

/// Verifies mismatched payloads fail to decode.
#[test]
fn mismatched_payload_fails_decode() {
    assert!(KindData::decode(WidgetKind::Countdown, json!([1, 2, 3])).is_err());
}

/// Verifies unknown kinds render the unsupported placeholder.
#[test]
fn unknown_kind_renders_placeholder() {
    let widget = Widget::from_row(&row("u", "weather", json!({})));
    let view = render_unsupported(&widget);
    assert!(view.unsupported);
    assert_eq!(view.lines, vec!["Widget type \"weather\" is not supported".to_string()]);
}

/// Verifies cached widgets render stale views and live ones do not.
#[test]
fn stale_widgets_render_stale_views() {
    let live = Widget::from_row(&row("k", "cinemateket", json!(null)));
    let data = KindData::decode(WidgetKind::Cinemateket, json!([])).unwrap();
    assert!(!render(&data, &live).stale);

    let cached = Widget::from_slim(&row("k", "cinemateket", json!(null)).slim());
    assert!(cached.stale);
    assert!(render(&data, &cached).stale);
    assert!(render_unsupported(&live.clone().into_stale()).stale);
    assert!(!render_unsupported(&live).stale);
}

/// Verifies slow-moving kinds refresh less often than live ones.
#[test]
fn default_poll_intervals_follow_kind() {
    assert_eq!(WidgetKind::ServerPings.default_poll_interval().as_secs(), 30);
    assert_eq!(WidgetKind::GroceryDeals.default_poll_interval().as_secs(), 30);
    assert_eq!(WidgetKind::Countdown.default_poll_interval().as_secs(), 3 * 60 * 60);
    assert_eq!(WidgetKind::Cinemateket.default_poll_interval().as_secs(), 6 * 60 * 60);
}
