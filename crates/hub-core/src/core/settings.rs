// crates/hub-core/src/core/settings.rs
// ============================================================================
// Module: Widget Settings
// Description: Per-kind settings shapes and the narrowing function.
// Purpose: Reconstruct typed settings from untrusted JSON without failing.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Settings arrive as an arbitrary JSON blob. [`narrow_settings`] inspects the
//! blob field by field and keeps only values with the expected primitive type,
//! filling kind defaults for everything else. It never returns an error: a
//! malformed blob yields default settings for the kind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::widget::KindTag;
use crate::core::widget::WidgetKind;

// ============================================================================
// SECTION: Per-Kind Settings
// ============================================================================

/// Settings for `server-pings` widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerPingsSettings {
    /// Single target URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Multiple target URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

/// Settings for `pi-health` widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiHealthSettings {
    /// Device identifier; empty when unset.
    pub device_id: String,
}

/// Settings for `grocery-deals` widgets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryDealsSettings {
    /// Search query; empty when unset.
    pub query: String,
    /// Maximum number of deals to show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// City filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Latitude filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Campaign provider for countdown widgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountdownProvider {
    /// Trippel-Trumf bonus days.
    #[default]
    TrippelTrumf,
    /// DNB Supertilbud campaign.
    DnbSupertilbud,
}

impl CountdownProvider {
    /// Returns the wire label for the provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrippelTrumf => "trippel-trumf",
            Self::DnbSupertilbud => "dnb-supertilbud",
        }
    }

    /// Returns a display name for the provider.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::TrippelTrumf => "Trippel-Trumf",
            Self::DnbSupertilbud => "DNB Supertilbud",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "trippel-trumf" => Some(Self::TrippelTrumf),
            "dnb-supertilbud" => Some(Self::DnbSupertilbud),
            _ => None,
        }
    }
}

/// Source of countdown targets. Only provider-backed countdowns exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountdownSource {
    /// Targets come from a campaign provider.
    #[default]
    Provider,
}

/// Settings for `countdown` widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownSettings {
    /// Countdown source.
    pub source: CountdownSource,
    /// Campaign provider.
    pub provider: CountdownProvider,
    /// Whether hours and minutes are shown alongside days.
    pub show_hours: bool,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            source: CountdownSource::Provider,
            provider: CountdownProvider::default(),
            show_hours: true,
        }
    }
}

/// Settings for `cinemateket` widgets. The kind has no options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CinemateketSettings {}

/// Narrowed settings tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WidgetSettings {
    /// `server-pings` settings.
    ServerPings(ServerPingsSettings),
    /// `pi-health` settings.
    PiHealth(PiHealthSettings),
    /// `grocery-deals` settings.
    GroceryDeals(GroceryDealsSettings),
    /// `countdown` settings.
    Countdown(CountdownSettings),
    /// `cinemateket` settings.
    Cinemateket(CinemateketSettings),
    /// Opaque settings of an unrecognized kind.
    Unknown(Value),
}

// ============================================================================
// SECTION: Narrowing
// ============================================================================

/// Narrows an untrusted settings blob for the given kind.
#[must_use]
pub fn narrow_settings(kind: &KindTag, raw: &Value) -> WidgetSettings {
    let KindTag::Known(kind) = kind else {
        return WidgetSettings::Unknown(raw.clone());
    };
    let fields = raw.as_object();
    match kind {
        WidgetKind::ServerPings => WidgetSettings::ServerPings(narrow_server_pings(fields)),
        WidgetKind::PiHealth => WidgetSettings::PiHealth(PiHealthSettings {
            device_id: string_field(fields, "deviceId").unwrap_or_default(),
        }),
        WidgetKind::GroceryDeals => WidgetSettings::GroceryDeals(GroceryDealsSettings {
            query: string_field(fields, "query").unwrap_or_default(),
            max_results: fields
                .and_then(|map| map.get("maxResults"))
                .and_then(Value::as_u64)
                .and_then(|value| u32::try_from(value).ok()),
            city: string_field(fields, "city"),
            lat: fields.and_then(|map| map.get("lat")).and_then(Value::as_f64),
            lon: fields.and_then(|map| map.get("lon")).and_then(Value::as_f64),
        }),
        WidgetKind::Countdown => WidgetSettings::Countdown(narrow_countdown(fields)),
        WidgetKind::Cinemateket => WidgetSettings::Cinemateket(CinemateketSettings {}),
    }
}

/// Narrows `server-pings` settings; an invalid targets list empties them.
fn narrow_server_pings(fields: Option<&Map<String, Value>>) -> ServerPingsSettings {
    let Some(map) = fields else {
        return ServerPingsSettings::default();
    };
    let targets = match map.get("targets") {
        None => None,
        Some(value) => {
            let parsed = value.as_array().and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
            });
            let Some(targets) = parsed else {
                return ServerPingsSettings::default();
            };
            Some(targets)
        }
    };
    ServerPingsSettings {
        target: string_field(fields, "target"),
        targets,
    }
}

/// Narrows countdown settings; an unknown provider falls back to the default.
fn narrow_countdown(fields: Option<&Map<String, Value>>) -> CountdownSettings {
    let source_ok = string_field(fields, "source").as_deref() == Some("provider");
    let provider = string_field(fields, "provider")
        .and_then(|value| CountdownProvider::parse(&value))
        .filter(|_| source_ok)
        .unwrap_or_default();
    let show_hours =
        fields.and_then(|map| map.get("showHours")).and_then(Value::as_bool).unwrap_or(true);
    CountdownSettings {
        source: CountdownSource::Provider,
        provider,
        show_hours,
    }
}

/// Returns a string field when present with the right type.
fn string_field(fields: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    fields.and_then(|map| map.get(key)).and_then(Value::as_str).map(str::to_string)
}
