// crates/hub-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Snapshot Store
// Description: Durable SnapshotStore backend using SQLite WAL.
// Purpose: Persist owner-scoped widget snapshots across restarts.
// Dependencies: hub-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`hub_core::SnapshotStore`] that keeps
//! one row per snapshot key with its write and expiry stamps. Expired rows
//! read as absent and can be purged in bulk. Storage contents are untrusted:
//! size limits and stamp checks fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_SNAPSHOT_BYTES;
pub use store::SqliteSnapshotStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
