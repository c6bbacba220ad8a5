// crates/hub-core/src/lib.rs
// ============================================================================
// Module: Widget Hub Core Library
// Description: Public API surface for the widget data and cache layer.
// Purpose: Expose widget types, collaborator interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, logging, runtime}
// ============================================================================

//! ## Overview
//! Widget Hub core resolves a user's widget list from an authoritative
//! backend, falls back to an owner-scoped snapshot when the backend is
//! unreachable, and seeds that snapshot after fresh fetches. It integrates
//! through explicit interfaces so HTTP clients, durable stores, and clocks can
//! be swapped without touching resolution logic.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod logging;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::BearerToken;
pub use interfaces::Clock;
pub use interfaces::FetchError;
pub use interfaces::KindFetcher;
pub use interfaces::ListSourceError;
pub use interfaces::SessionProvider;
pub use interfaces::SnapshotStore;
pub use interfaces::StoreError;
pub use interfaces::StoredSnapshot;
pub use interfaces::SystemClock;
pub use interfaces::WidgetListSource;
pub use logging::FileLogSink;
pub use logging::HubLogEvent;
pub use logging::HubLogSink;
pub use logging::LogLevel;
pub use logging::MemoryLogSink;
pub use logging::NoopLogSink;
pub use logging::StderrLogSink;
pub use logging::WarnOnce;
pub use runtime::CacheSeeder;
pub use runtime::CachedWidgets;
pub use runtime::InMemorySnapshotStore;
pub use runtime::SeedOutcome;
pub use runtime::WidgetListResolver;
pub use runtime::WidgetSnapshotCache;
pub use runtime::is_offline_message;
