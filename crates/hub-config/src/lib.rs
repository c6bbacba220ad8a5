// crates/hub-config/src/lib.rs
// ============================================================================
// Module: Widget Hub Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for hub.toml semantics.
// Dependencies: hub-core, hub-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `hub-config` defines the configuration model for the widget hub. Loading
//! is strict and fail-closed: every section is validated before any
//! collaborator is built from it. Secrets never live in the file; the
//! session section only names the environment variable holding the token.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
