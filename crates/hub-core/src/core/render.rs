// crates/hub-core/src/core/render.rs
// ============================================================================
// Module: Widget Rendering
// Description: Text views for widget data, one renderer per kind.
// Purpose: Provide the render half of the kind registry contract.
// Dependencies: serde, url
// ============================================================================

//! ## Overview
//! Rendering turns decoded [`KindData`] into a [`WidgetView`], a small text
//! summary that front-ends can lay out. Dispatch matches exhaustively on the
//! data variant so a new kind fails to compile until it has a renderer.
//! Widgets of unknown kinds render an unsupported placeholder.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::core::data::CountdownData;
use crate::core::data::FilmShowing;
use crate::core::data::GroceryDealsData;
use crate::core::data::KindData;
use crate::core::data::PiHealthData;
use crate::core::data::PingsData;
use crate::core::settings::CountdownProvider;
use crate::core::settings::WidgetSettings;
use crate::core::widget::Widget;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Rendered widget summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetView {
    /// Heading shown above the body.
    pub title: String,
    /// Body lines in display order.
    pub lines: Vec<String>,
    /// Whether the view is backed by cached data.
    pub stale: bool,
    /// Whether the widget kind has no renderer.
    pub unsupported: bool,
}

impl WidgetView {
    /// Builds a view with the provided lines.
    #[must_use]
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
            stale: false,
            unsupported: false,
        }
    }

    /// Marks the view as stale.
    #[must_use]
    pub const fn into_stale(mut self) -> Self {
        self.stale = true;
        self
    }
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Renders decoded data for a widget.
///
/// Views of stale widgets are flagged stale.
#[must_use]
pub fn render(data: &KindData, widget: &Widget) -> WidgetView {
    let view = match data {
        KindData::ServerPings(data) => render_server_pings(data, widget),
        KindData::PiHealth(data) => render_pi_health(data, widget),
        KindData::GroceryDeals(data) => render_grocery_deals(data, widget),
        KindData::Countdown(data) => render_countdown(data, widget),
        KindData::Cinemateket(showings) => render_cinemateket(showings, widget),
    };
    if widget.stale { view.into_stale() } else { view }
}

/// Returns the user-facing message for an unsupported kind.
#[must_use]
pub fn unsupported_message(kind: &str) -> String {
    format!("Widget type \"{kind}\" is not supported")
}

/// Renders the placeholder shown for widgets of an unsupported kind.
#[must_use]
pub fn render_unsupported(widget: &Widget) -> WidgetView {
    let mut view = WidgetView::new(widget.title.clone(), vec![unsupported_message(
        widget.kind.as_str(),
    )]);
    view.unsupported = true;
    view.stale = widget.stale;
    view
}

// ============================================================================
// SECTION: Per-Kind Renderers
// ============================================================================

/// Renders endpoint checks as `host path status latency`.
fn render_server_pings(data: &PingsData, widget: &Widget) -> WidgetView {
    if data.data.is_empty() {
        return WidgetView::new(widget.title.clone(), vec!["No endpoints to show".to_string()]);
    }
    let mut lines = Vec::with_capacity(data.data.len() + 1);
    if let Some(updated) = &data.updated_at {
        lines.push(format!("Updated {updated}"));
    }
    for row in &data.data {
        let (host, path) = url_parts(&row.url);
        let target = if path.is_empty() { host } else { format!("{host}{path}") };
        lines.push(format!("{target} {} {} ms", row.status, row.ms));
    }
    WidgetView::new(widget.title.clone(), lines)
}

/// Splits a URL into host and path, keeping the raw text when it does not parse.
fn url_parts(raw: &str) -> (String, String) {
    let Ok(parsed) = Url::parse(raw) else {
        return (raw.to_string(), String::new());
    };
    let host = parsed.host_str().unwrap_or(raw).to_string();
    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }
    if path == "/" {
        path.clear();
    }
    (host, path)
}

/// Renders one line per device with whatever metrics the snapshot carries.
fn render_pi_health(data: &PiHealthData, widget: &Widget) -> WidgetView {
    let wanted = match &widget.settings {
        WidgetSettings::PiHealth(settings) if !settings.device_id.is_empty() => {
            Some(settings.device_id.as_str())
        }
        _ => None,
    };
    let lines: Vec<String> = data
        .data
        .iter()
        .filter(|row| wanted.is_none_or(|device| device == row.device_id))
        .map(|row| {
            let seen = row.last_seen.as_deref().unwrap_or("never");
            let metrics = row.snapshot.as_ref().map(snapshot_summary).unwrap_or_default();
            if metrics.is_empty() {
                format!("{} (last seen {seen})", row.name)
            } else {
                format!("{} (last seen {seen}) {metrics}", row.name)
            }
        })
        .collect();
    if lines.is_empty() {
        return WidgetView::new(widget.title.clone(), vec!["No devices reporting".to_string()]);
    }
    WidgetView::new(widget.title.clone(), lines)
}

/// Formats the known numeric metrics of a device snapshot.
fn snapshot_summary(snapshot: &Value) -> String {
    const METRICS: [(&str, &str); 4] = [
        ("cpuTempC", "C"),
        ("cpuPct", "% cpu"),
        ("memUsedMb", " MB mem"),
        ("diskUsedPct", "% disk"),
    ];
    METRICS
        .iter()
        .filter_map(|(key, suffix)| {
            snapshot.get(*key).and_then(Value::as_f64).map(|value| format!("{value:.1}{suffix}"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders deals as `name @ store: price`.
fn render_grocery_deals(data: &GroceryDealsData, widget: &Widget) -> WidgetView {
    let limit = match &widget.settings {
        WidgetSettings::GroceryDeals(settings) => {
            settings.max_results.and_then(|value| usize::try_from(value).ok())
        }
        _ => None,
    }
    .unwrap_or(usize::MAX);
    let lines: Vec<String> = data
        .deals
        .iter()
        .take(limit)
        .map(|deal| {
            let mut line = format!("{} @ {}: {:.2} kr", deal.name, deal.store, deal.price);
            if let (Some(unit_price), Some(unit)) = (deal.unit_price, deal.unit.as_deref()) {
                line.push_str(&format!(" ({unit_price:.2} kr/{unit})"));
            }
            line
        })
        .collect();
    if lines.is_empty() {
        return WidgetView::new(widget.title.clone(), vec!["No deals found".to_string()]);
    }
    WidgetView::new(widget.title.clone(), lines)
}

/// Renders the campaign label with its next start or ongoing state.
fn render_countdown(data: &CountdownData, widget: &Widget) -> WidgetView {
    let provider = match &widget.settings {
        WidgetSettings::Countdown(settings) => settings.provider,
        _ => CountdownProvider::default(),
    };
    let label = provider.display_name();
    let line = if data.ongoing {
        format!("{label}: ongoing")
    } else if let Some(next) = &data.next_iso {
        format!("{label}: next {next}")
    } else {
        format!("{label}: no upcoming date")
    };
    WidgetView::new(widget.title.clone(), vec![line])
}

/// Renders screenings as `time title (year)`.
fn render_cinemateket(showings: &[FilmShowing], widget: &Widget) -> WidgetView {
    if showings.is_empty() {
        return WidgetView::new(widget.title.clone(), vec!["No upcoming screenings".to_string()]);
    }
    let lines = showings
        .iter()
        .map(|showing| match showing.year {
            Some(year) => format!("{} {} ({year})", showing.show_time, showing.title),
            None => format!("{} {}", showing.show_time, showing.title),
        })
        .collect();
    WidgetView::new(widget.title.clone(), lines)
}
