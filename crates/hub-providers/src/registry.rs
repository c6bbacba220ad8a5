// crates/hub-providers/src/registry.rs
// ============================================================================
// Module: Kind Registry
// Description: Mapping from widget kind to fetcher, renderer, and interval.
// Purpose: Give pollers one lookup per widget with an explicit miss value.
// Dependencies: hub-core
// ============================================================================

//! ## Overview
//! The registry is built once at startup and read by every poller. Looking
//! up a kind the registry does not hold returns [`KindLookup::Unsupported`]
//! carrying the raw label, which the caller renders as a placeholder.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use hub_core::KindData;
use hub_core::KindFetcher;
use hub_core::KindTag;
use hub_core::SessionProvider;
use hub_core::Widget;
use hub_core::WidgetKind;
use hub_core::WidgetView;

use crate::http::BackendClient;
use crate::kinds::HttpKindFetcher;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Renderer signature shared by every kind.
pub type RenderFn = fn(&KindData, &Widget) -> WidgetView;

/// Registry entry for one kind.
#[derive(Clone)]
pub struct KindEntry {
    /// Data fetcher.
    pub fetcher: Arc<dyn KindFetcher>,
    /// Renderer for fetched data.
    pub render: RenderFn,
    /// Delay between fetches.
    pub poll_interval: Duration,
}

impl KindEntry {
    /// Creates an entry using the standard renderer.
    #[must_use]
    pub fn new(fetcher: Arc<dyn KindFetcher>, poll_interval: Duration) -> Self {
        Self {
            fetcher,
            render: hub_core::render,
            poll_interval,
        }
    }
}

/// Result of a registry lookup.
#[derive(Clone)]
pub enum KindLookup<'r> {
    /// The kind has a registered entry.
    Supported(&'r KindEntry),
    /// The kind is unknown or unregistered; carries the raw label.
    Unsupported(String),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Kind-to-entry mapping.
#[derive(Clone, Default)]
pub struct KindRegistry {
    /// Registered entries.
    entries: BTreeMap<WidgetKind, KindEntry>,
}

impl KindRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry with an HTTP fetcher for every known kind.
    ///
    /// `interval_for` supplies the poll interval per kind.
    #[must_use]
    pub fn from_http(
        client: &BackendClient,
        session: &Arc<dyn SessionProvider>,
        data_timeout: Duration,
        interval_for: impl Fn(WidgetKind) -> Duration,
    ) -> Self {
        let mut registry = Self::new();
        for kind in WidgetKind::ALL {
            let fetcher =
                HttpKindFetcher::new(client.clone(), Arc::clone(session), kind, data_timeout);
            registry.register(kind, KindEntry::new(Arc::new(fetcher), interval_for(kind)));
        }
        registry
    }

    /// Registers or replaces the entry for `kind`.
    pub fn register(&mut self, kind: WidgetKind, entry: KindEntry) {
        self.entries.insert(kind, entry);
    }

    /// Looks up the entry for a kind tag.
    #[must_use]
    pub fn lookup(&self, tag: &KindTag) -> KindLookup<'_> {
        match tag.known().and_then(|kind| self.entries.get(&kind)) {
            Some(entry) => KindLookup::Supported(entry),
            None => KindLookup::Unsupported(tag.as_str().to_string()),
        }
    }

    /// Returns the registered kinds in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<WidgetKind> {
        self.entries.keys().copied().collect()
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no kind is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
