// crates/hub-core/src/runtime/snapshot.rs
// ============================================================================
// Module: Widget Snapshot Cache
// Description: Owner-scoped, settings-free snapshot of the last good list.
// Purpose: Serve a fallback widget list when the backend is unreachable.
// Dependencies: crate::{core, interfaces, logging}, serde, serde_json
// ============================================================================

//! ## Overview
//! Snapshots are JSON records `{writtenAtEpochMs, items}` stored under
//! `widgets_cache:<ownerId>` with a seven-day expiration. Writes overwrite
//! unconditionally. Reads never fail: unparseable records, records without an
//! owner, and records whose items are all malformed read as "no cache", and
//! partially malformed item arrays are filtered down to their valid entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::OwnerId;
use crate::core::widget::SlimWidget;
use crate::interfaces::Clock;
use crate::interfaces::SnapshotStore;
use crate::interfaces::StoreError;
use crate::interfaces::StoredSnapshot;
use crate::interfaces::SystemClock;
use crate::logging::HubLogEvent;
use crate::logging::HubLogSink;
use crate::logging::LogLevel;
use crate::logging::NoopLogSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix of every snapshot key.
pub const SNAPSHOT_KEY_PREFIX: &str = "widgets_cache";
/// Default snapshot lifetime.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

// ============================================================================
// SECTION: Types
// ============================================================================

/// Snapshot contents returned by a successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedWidgets {
    /// Valid slim rows in stored order.
    pub items: Vec<SlimWidget>,
    /// Milliseconds elapsed since the snapshot was written.
    pub age_ms: i64,
}

/// Serialized snapshot record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord<'a> {
    /// Write time (milliseconds since epoch).
    written_at_epoch_ms: i64,
    /// Slim rows.
    items: &'a [SlimWidget],
}

/// Owner-scoped snapshot cache over a [`SnapshotStore`].
#[derive(Clone)]
pub struct WidgetSnapshotCache {
    /// Backing store.
    store: Arc<dyn SnapshotStore>,
    /// Time source for stamps, expiry, and age.
    clock: Arc<dyn Clock>,
    /// Snapshot lifetime.
    ttl: Duration,
    /// Operator log sink.
    log: Arc<dyn HubLogSink>,
}

impl WidgetSnapshotCache {
    /// Creates a cache over `store` using the system clock and default TTL.
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ttl: DEFAULT_SNAPSHOT_TTL,
            log: Arc::new(NoopLogSink),
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the snapshot lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replaces the operator log sink.
    #[must_use]
    pub fn with_log_sink(mut self, log: Arc<dyn HubLogSink>) -> Self {
        self.log = log;
        self
    }

    /// Returns the storage key for an owner.
    #[must_use]
    pub fn key_for(owner: &OwnerId) -> String {
        format!("{SNAPSHOT_KEY_PREFIX}:{}", owner.as_str())
    }

    /// Reads the snapshot for `owner`.
    ///
    /// Returns `None` when no owner is given, nothing is stored, the record
    /// expired or cannot be parsed, or no stored item is a valid slim row.
    #[must_use]
    pub fn read(&self, owner: Option<&OwnerId>) -> Option<CachedWidgets> {
        let owner = owner.filter(|owner| !owner.is_blank())?;
        let now = self.clock.now_ms();
        let record = match self.store.load(&Self::key_for(owner), now) {
            Ok(record) => record?,
            Err(err) => {
                self.log.record(
                    &HubLogEvent::new("snapshot_read_failed", LogLevel::Warn, err.to_string())
                        .with_owner(owner.as_str()),
                );
                return None;
            }
        };
        let parsed: Value = serde_json::from_slice(&record.payload).ok()?;
        let items: Vec<SlimWidget> = parsed
            .get("items")
            .and_then(Value::as_array)?
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect();
        if items.is_empty() {
            return None;
        }
        let written_at = parsed
            .get("writtenAtEpochMs")
            .and_then(Value::as_i64)
            .unwrap_or(record.written_at_ms);
        Some(CachedWidgets {
            items,
            age_ms: now.saturating_sub(written_at).max(0),
        })
    }

    /// Overwrites the snapshot for `owner` with `items`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the owner is blank, encoding fails, or the
    /// store rejects the write.
    pub fn write(&self, owner: &OwnerId, items: &[SlimWidget]) -> Result<(), StoreError> {
        if owner.is_blank() {
            return Err(StoreError::Invalid("snapshot owner must be non-empty".to_string()));
        }
        let now = self.clock.now_ms();
        let payload = serde_json::to_vec(&SnapshotRecord {
            written_at_epoch_ms: now,
            items,
        })
        .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX).max(1);
        let snapshot = StoredSnapshot {
            payload,
            written_at_ms: now,
            expires_at_ms: now.saturating_add(ttl_ms),
        };
        self.store.save(&Self::key_for(owner), &snapshot)
    }
}
