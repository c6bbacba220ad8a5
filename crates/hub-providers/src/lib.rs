// crates/hub-providers/src/lib.rs
// ============================================================================
// Module: Widget Hub Providers
// Description: Backend collaborators, kind registry, and widget pollers.
// Purpose: Connect the data layer to the backend API and keep widgets fresh.
// Dependencies: hub-core, reqwest, tokio, url
// ============================================================================

//! ## Overview
//! This crate implements the network-facing side of the widget hub:
//! - [`HttpWidgetListSource`] fetches the widget list and reports structured
//!   failures the resolver classifies as offline or not.
//! - [`HttpKindFetcher`] fetches per-kind data for one widget instance.
//! - [`WidgetMutationClient`] creates, updates, and deletes widgets.
//! - [`KindRegistry`] maps each kind to its fetcher and poll interval.
//! - [`WidgetPoller`] and [`WidgetPollers`] run one refresh loop per
//!   widget instance, each owned by a cancellable [`PollHandle`].
//!
//! Backend responses are untrusted: bodies are size-limited and decoded
//! into typed structures before use.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;
pub mod kinds;
pub mod list;
pub mod mutations;
pub mod poller;
pub mod registry;
pub mod session;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::BackendClient;
pub use http::BackendClientConfig;
pub use http::HttpError;
pub use kinds::HttpKindFetcher;
pub use list::HttpWidgetListSource;
pub use mutations::CreateWidgetRequest;
pub use mutations::DEFAULT_GRID;
pub use mutations::MutationError;
pub use mutations::UpdateWidgetRequest;
pub use mutations::WidgetMutationClient;
pub use poller::POLL_ERROR_MESSAGE;
pub use poller::PollHandle;
pub use poller::PollSnapshot;
pub use poller::PollState;
pub use poller::WidgetPoller;
pub use poller::WidgetPollers;
pub use registry::KindEntry;
pub use registry::KindLookup;
pub use registry::KindRegistry;
pub use registry::RenderFn;
pub use session::EnvSessionProvider;
pub use session::StaticSessionProvider;
