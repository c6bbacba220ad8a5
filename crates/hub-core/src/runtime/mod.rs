// crates/hub-core/src/runtime/mod.rs
// ============================================================================
// Module: Widget Hub Runtime
// Description: Resolution, snapshot caching, and seeding.
// Purpose: Implement stale-while-unreachable list resolution.
// Dependencies: crate::{core, interfaces, logging}
// ============================================================================

//! ## Overview
//! The runtime wires the collaborator interfaces into the list resolution
//! flow: resolve, fall back to the snapshot, and seed after fresh fetches.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod offline;
pub mod resolver;
pub mod seeder;
pub mod snapshot;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use offline::is_offline_message;
pub use resolver::WidgetListResolver;
pub use seeder::CacheSeeder;
pub use seeder::SeedOutcome;
pub use snapshot::CachedWidgets;
pub use snapshot::DEFAULT_SNAPSHOT_TTL;
pub use snapshot::SNAPSHOT_KEY_PREFIX;
pub use snapshot::WidgetSnapshotCache;
pub use store::InMemorySnapshotStore;
