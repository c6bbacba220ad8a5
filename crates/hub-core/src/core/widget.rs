// crates/hub-core/src/core/widget.rs
// ============================================================================
// Module: Widget Model
// Description: Widget kinds, layout, list rows, and the typed widget record.
// Purpose: Turn untrusted list rows into typed widgets without ever failing.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The backend returns widget rows whose `kind` and `settings` are untrusted.
//! [`WidgetKind`] is the closed set of kinds this layer knows how to fetch and
//! render; [`KindTag`] keeps unrecognized kinds around so they can degrade to
//! an "unsupported" placeholder instead of failing the list. [`SlimWidget`] is
//! the settings-free projection persisted in the snapshot cache.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::InstanceId;
use crate::core::identifiers::WidgetId;
use crate::core::settings::WidgetSettings;
use crate::core::settings::narrow_settings;

// ============================================================================
// SECTION: Widget Kinds
// ============================================================================

/// Closed set of widget kinds understood by the data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    /// Endpoint reachability and latency checks.
    ServerPings,
    /// Raspberry Pi device health snapshots.
    PiHealth,
    /// Grocery offers matching a search query.
    GroceryDeals,
    /// Countdown to the next provider campaign.
    Countdown,
    /// Upcoming cinematheque screenings.
    Cinemateket,
}

impl WidgetKind {
    /// Every known kind in declaration order.
    pub const ALL: [Self; 5] =
        [Self::ServerPings, Self::PiHealth, Self::GroceryDeals, Self::Countdown, Self::Cinemateket];

    /// Returns the wire label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServerPings => "server-pings",
            Self::PiHealth => "pi-health",
            Self::GroceryDeals => "grocery-deals",
            Self::Countdown => "countdown",
            Self::Cinemateket => "cinemateket",
        }
    }

    /// Parses a wire label into a known kind.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Returns the built-in refresh interval for the kind.
    #[must_use]
    pub const fn default_poll_interval(self) -> Duration {
        match self {
            Self::ServerPings | Self::PiHealth | Self::GroceryDeals => Duration::from_secs(30),
            Self::Countdown => Duration::from_secs(3 * 60 * 60),
            Self::Cinemateket => Duration::from_secs(6 * 60 * 60),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind label as received from the backend.
///
/// # Invariants
/// - `Unknown` never holds a label that parses as a [`WidgetKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KindTag {
    /// Kind handled by the data layer.
    Known(WidgetKind),
    /// Kind this build does not recognize; rendered as unsupported.
    Unknown(String),
}

impl KindTag {
    /// Classifies a raw kind label.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        WidgetKind::parse(raw).map_or_else(|| Self::Unknown(raw.to_string()), Self::Known)
    }

    /// Returns the wire label for the tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(kind) => kind.as_str(),
            Self::Unknown(raw) => raw,
        }
    }

    /// Returns the known kind, if any.
    #[must_use]
    pub const fn known(&self) -> Option<WidgetKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for KindTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Layout
// ============================================================================

/// Typed grid placement sent when creating a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    /// Column offset.
    pub x: i64,
    /// Row offset.
    pub y: i64,
    /// Width in columns.
    pub w: i64,
    /// Height in rows.
    pub h: i64,
}

/// Grid placement as stored by the backend. Opaque to the data layer.
///
/// Any JSON object is accepted, including `{}` for widgets that were never
/// placed; non-objects are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridLayout(Map<String, Value>);

impl GridLayout {
    /// Returns the raw layout object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns true when the backend sent no placement.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<GridRect> for GridLayout {
    fn from(rect: GridRect) -> Self {
        let mut map = Map::new();
        map.insert("x".to_string(), Value::from(rect.x));
        map.insert("y".to_string(), Value::from(rect.y));
        map.insert("w".to_string(), Value::from(rect.w));
        map.insert("h".to_string(), Value::from(rect.h));
        Self(map)
    }
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Settings-free widget projection stored in the snapshot cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlimWidget {
    /// Durable widget identifier.
    pub id: WidgetId,
    /// Instance identifier used for fetch and poll identity.
    pub instance_id: InstanceId,
    /// Raw kind label.
    pub kind: String,
    /// Display title.
    pub title: String,
    /// Grid placement.
    pub grid: GridLayout,
}

/// Widget row as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRow {
    /// Durable widget identifier.
    pub id: WidgetId,
    /// Instance identifier used for fetch and poll identity.
    pub instance_id: InstanceId,
    /// Raw kind label.
    pub kind: String,
    /// Display title.
    pub title: String,
    /// Grid placement.
    pub grid: GridLayout,
    /// Untrusted kind-specific settings blob.
    #[serde(default)]
    pub settings: Value,
}

impl WidgetRow {
    /// Returns the slim projection persisted by the snapshot cache.
    #[must_use]
    pub fn slim(&self) -> SlimWidget {
        SlimWidget {
            id: self.id.clone(),
            instance_id: self.instance_id.clone(),
            kind: self.kind.clone(),
            title: self.title.clone(),
            grid: self.grid.clone(),
        }
    }
}

// ============================================================================
// SECTION: Typed Widget
// ============================================================================

/// Typed widget with narrowed settings.
///
/// # Invariants
/// - `settings` always matches `kind` (unknown kinds carry opaque settings).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    /// Durable widget identifier.
    pub id: WidgetId,
    /// Instance identifier used for fetch and poll identity.
    pub instance_id: InstanceId,
    /// Classified kind.
    pub kind: KindTag,
    /// Display title.
    pub title: String,
    /// Grid placement.
    pub grid: GridLayout,
    /// Narrowed settings for the kind.
    pub settings: WidgetSettings,
    /// Whether the widget is served from the snapshot cache.
    pub stale: bool,
}

impl Widget {
    /// Builds a typed widget from a list row, defaulting invalid settings.
    #[must_use]
    pub fn from_row(row: &WidgetRow) -> Self {
        let kind = KindTag::parse(&row.kind);
        let settings = narrow_settings(&kind, &row.settings);
        Self {
            id: row.id.clone(),
            instance_id: row.instance_id.clone(),
            kind,
            title: row.title.clone(),
            grid: row.grid.clone(),
            settings,
            stale: false,
        }
    }

    /// Builds a typed widget from a cached slim row using kind defaults.
    ///
    /// Cached widgets are always flagged stale.
    #[must_use]
    pub fn from_slim(slim: &SlimWidget) -> Self {
        let kind = KindTag::parse(&slim.kind);
        let settings = narrow_settings(&kind, &Value::Null);
        Self {
            id: slim.id.clone(),
            instance_id: slim.instance_id.clone(),
            kind,
            title: slim.title.clone(),
            grid: slim.grid.clone(),
            settings,
            stale: true,
        }
    }

    /// Returns the widget flagged as served from cache.
    #[must_use]
    pub fn into_stale(mut self) -> Self {
        self.stale = true;
        self
    }

    /// Returns the `<kind>:<instanceId>` key used for polling and log scoping.
    #[must_use]
    pub fn widget_key(&self) -> String {
        format!("{}:{}", self.kind, self.instance_id)
    }
}
