// crates/hub-core/src/runtime/resolver.rs
// ============================================================================
// Module: Widget List Resolver
// Description: Authoritative list fetch with snapshot fallback.
// Purpose: Always produce one of the four resolution outcomes, never an error.
// Dependencies: crate::{core, interfaces, logging, runtime::snapshot}
// ============================================================================

//! ## Overview
//! One call to [`WidgetListResolver::resolve`] makes at most one list request.
//! A missing session short-circuits to a failure without touching the network.
//! Failures are classified offline or not, then the owner's snapshot is tried;
//! a usable snapshot yields a stale result, otherwise an empty one. Retrying
//! is left to whoever calls `resolve` again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::identifiers::OwnerId;
use crate::core::resolution::ListResolution;
use crate::core::widget::Widget;
use crate::interfaces::ListSourceError;
use crate::interfaces::SessionProvider;
use crate::interfaces::WidgetListSource;
use crate::logging::HubLogEvent;
use crate::logging::HubLogSink;
use crate::logging::LogLevel;
use crate::logging::NoopLogSink;
use crate::runtime::snapshot::WidgetSnapshotCache;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves a user's widget list with stale-while-unreachable fallback.
#[derive(Clone)]
pub struct WidgetListResolver {
    /// Authoritative list source.
    source: Arc<dyn WidgetListSource>,
    /// Session lookup for the bearer credential.
    session: Arc<dyn SessionProvider>,
    /// Snapshot fallback.
    cache: WidgetSnapshotCache,
    /// Operator log sink.
    log: Arc<dyn HubLogSink>,
}

impl WidgetListResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        source: Arc<dyn WidgetListSource>,
        session: Arc<dyn SessionProvider>,
        cache: WidgetSnapshotCache,
    ) -> Self {
        Self {
            source,
            session,
            cache,
            log: Arc::new(NoopLogSink),
        }
    }

    /// Replaces the operator log sink.
    #[must_use]
    pub fn with_log_sink(mut self, log: Arc<dyn HubLogSink>) -> Self {
        self.log = log;
        self
    }

    /// Returns the snapshot cache used for fallback.
    #[must_use]
    pub const fn cache(&self) -> &WidgetSnapshotCache {
        &self.cache
    }

    /// Resolves the widget list for `owner`.
    pub async fn resolve(&self, owner: Option<&OwnerId>) -> ListResolution {
        let fetched = match self.session.bearer_token().await {
            Some(token) => self.source.fetch_list(&token).await,
            None => Err(ListSourceError::Unauthenticated),
        };
        match fetched {
            Ok(rows) => {
                let widgets = rows.iter().map(Widget::from_row).collect();
                ListResolution::Fresh {
                    widgets,
                    rows,
                }
            }
            Err(err) => self.fall_back(owner, &err),
        }
    }

    /// Builds the failure outcome, preferring the owner's snapshot.
    fn fall_back(&self, owner: Option<&OwnerId>, err: &ListSourceError) -> ListResolution {
        let error = err.to_string();
        let offline = err.is_offline();
        let mut event = HubLogEvent::new("widget_list_failed", LogLevel::Warn, error.clone());
        if let Some(owner) = owner {
            event = event.with_owner(owner.as_str());
        }
        self.log.record(&event);
        match self.cache.read(owner) {
            Some(cached) => ListResolution::Stale {
                widgets: cached.items.iter().map(Widget::from_slim).collect(),
                error,
                offline,
            },
            None => ListResolution::empty_failure(error, offline),
        }
    }
}
