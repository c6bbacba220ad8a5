// crates/hub-core/src/core/mod.rs
// ============================================================================
// Module: Widget Hub Core Types
// Description: Widget model, settings, data payloads, rendering, and results.
// Purpose: Provide stable, serializable types shared by every hub crate.
// Dependencies: serde, serde_json, url
// ============================================================================

//! ## Overview
//! Core types describe widgets as the backend returns them, the typed form the
//! rest of the system works with, and the outcomes the resolver can produce.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod data;
pub mod identifiers;
pub mod render;
pub mod resolution;
pub mod settings;
pub mod widget;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use data::CountdownData;
pub use data::Deal;
pub use data::FilmShowing;
pub use data::GroceryDealsData;
pub use data::KindData;
pub use data::PiHealthData;
pub use data::PiHealthRow;
pub use data::PingRow;
pub use data::PingsData;
pub use identifiers::InstanceId;
pub use identifiers::OwnerId;
pub use identifiers::WidgetId;
pub use render::WidgetView;
pub use render::render;
pub use render::render_unsupported;
pub use render::unsupported_message;
pub use resolution::BuildProfile;
pub use resolution::DashboardView;
pub use resolution::ListResolution;
pub use resolution::ResolutionReport;
pub use settings::CinemateketSettings;
pub use settings::CountdownProvider;
pub use settings::CountdownSettings;
pub use settings::GroceryDealsSettings;
pub use settings::PiHealthSettings;
pub use settings::ServerPingsSettings;
pub use settings::WidgetSettings;
pub use settings::narrow_settings;
pub use widget::GridLayout;
pub use widget::GridRect;
pub use widget::KindTag;
pub use widget::SlimWidget;
pub use widget::Widget;
pub use widget::WidgetKind;
pub use widget::WidgetRow;
