// crates/hub-core/src/core/data.rs
// ============================================================================
// Module: Widget Data
// Description: Payloads returned by the per-kind data endpoints.
// Purpose: Decode kind-specific JSON into typed data for rendering.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each widget kind has its own data endpoint and payload shape. [`KindData`]
//! tags a decoded payload with its kind so render dispatch stays exhaustive.
//! Unknown fields are ignored and optional fields default to `None`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::widget::WidgetKind;

// ============================================================================
// SECTION: Server Pings
// ============================================================================

/// One endpoint check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingRow {
    /// Checked URL.
    pub url: String,
    /// HTTP status observed (0 when unreachable).
    pub status: u16,
    /// Latency in milliseconds.
    pub ms: u64,
    /// Check timestamp (ISO-8601).
    pub checked_at: String,
}

/// `server-pings` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingsData {
    /// Backend status label.
    pub status: String,
    /// Endpoint checks.
    pub data: Vec<PingRow>,
    /// Last refresh timestamp (ISO-8601).
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ============================================================================
// SECTION: Pi Health
// ============================================================================

/// Health row for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiHealthRow {
    /// Device identifier.
    pub device_id: String,
    /// Device display name.
    pub name: String,
    /// Last heartbeat timestamp.
    #[serde(default)]
    pub last_seen: Option<String>,
    /// Raw metrics snapshot.
    #[serde(default)]
    pub snapshot: Option<Value>,
    /// Snapshot timestamp.
    #[serde(default)]
    pub ts: Option<String>,
}

/// `pi-health` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiHealthData {
    /// Backend status label.
    pub status: String,
    /// Device rows.
    pub data: Vec<PiHealthRow>,
    /// Last refresh timestamp (ISO-8601).
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ============================================================================
// SECTION: Grocery Deals
// ============================================================================

/// One grocery offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// Product name.
    pub name: String,
    /// Store name.
    pub store: String,
    /// Offer price.
    pub price: f64,
    /// Vendor-provided unit price.
    #[serde(default)]
    pub unit_price: Option<f64>,
    /// Unit label for the unit price.
    #[serde(default)]
    pub unit: Option<String>,
    /// Offer start date.
    #[serde(default)]
    pub valid_from: Option<String>,
    /// Offer end date.
    #[serde(default)]
    pub valid_until: Option<String>,
    /// Product image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Store logo URL.
    #[serde(default)]
    pub store_logo: Option<String>,
}

/// `grocery-deals` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryDealsData {
    /// Offers ordered by relevance.
    pub deals: Vec<Deal>,
    /// Whether names were cleaned up by the enrichment pass.
    #[serde(default)]
    pub is_enriched: bool,
}

// ============================================================================
// SECTION: Countdown
// ============================================================================

/// `countdown` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownData {
    /// Server time (ISO-8601).
    pub now_iso: String,
    /// Next campaign start, if scheduled.
    #[serde(default)]
    pub next_iso: Option<String>,
    /// Previous campaign start, if known.
    #[serde(default)]
    pub previous_iso: Option<String>,
    /// Whether a campaign is running now.
    #[serde(default)]
    pub ongoing: bool,
}

// ============================================================================
// SECTION: Cinemateket
// ============================================================================

/// One screening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmShowing {
    /// Film title.
    pub title: String,
    /// Director, when listed.
    #[serde(default)]
    pub director: Option<String>,
    /// Release year, when listed.
    #[serde(default)]
    pub year: Option<i32>,
    /// Screening time (ISO-8601).
    pub show_time: String,
    /// Ticket purchase URL.
    #[serde(default)]
    pub ticket_url: Option<String>,
    /// Film detail URL.
    #[serde(default)]
    pub film_url: Option<String>,
    /// Organizer name.
    #[serde(default)]
    pub organizer: Option<String>,
}

// ============================================================================
// SECTION: Tagged Data
// ============================================================================

/// Decoded data tagged by widget kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KindData {
    /// `server-pings` data.
    ServerPings(PingsData),
    /// `pi-health` data.
    PiHealth(PiHealthData),
    /// `grocery-deals` data.
    GroceryDeals(GroceryDealsData),
    /// `countdown` data.
    Countdown(CountdownData),
    /// `cinemateket` data.
    Cinemateket(Vec<FilmShowing>),
}

impl KindData {
    /// Decodes an endpoint payload for the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the payload does not match the kind.
    pub fn decode(kind: WidgetKind, payload: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            WidgetKind::ServerPings => Self::ServerPings(serde_json::from_value(payload)?),
            WidgetKind::PiHealth => Self::PiHealth(serde_json::from_value(payload)?),
            WidgetKind::GroceryDeals => Self::GroceryDeals(serde_json::from_value(payload)?),
            WidgetKind::Countdown => Self::Countdown(serde_json::from_value(payload)?),
            WidgetKind::Cinemateket => Self::Cinemateket(serde_json::from_value(payload)?),
        })
    }

    /// Returns the kind this data belongs to.
    #[must_use]
    pub const fn kind(&self) -> WidgetKind {
        match self {
            Self::ServerPings(_) => WidgetKind::ServerPings,
            Self::PiHealth(_) => WidgetKind::PiHealth,
            Self::GroceryDeals(_) => WidgetKind::GroceryDeals,
            Self::Countdown(_) => WidgetKind::Countdown,
            Self::Cinemateket(_) => WidgetKind::Cinemateket,
        }
    }
}
