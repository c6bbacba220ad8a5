// crates/hub-core/src/runtime/seeder.rs
// ============================================================================
// Module: Cache Seeder
// Description: At-most-once write-through of fresh lists into the snapshot.
// Purpose: Keep snapshots current without ever writing stale data.
// Dependencies: crate::{core, logging, runtime::snapshot}
// ============================================================================

//! ## Overview
//! A [`CacheSeeder`] belongs to one dashboard mount. Its first eligible call
//! writes the fresh rows for the owner; every later call is a no-op. Only
//! fresh, non-empty results with a known owner are eligible, so snapshots are
//! never rebuilt from cached data. Write failures are logged and swallowed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::core::identifiers::OwnerId;
use crate::core::resolution::ListResolution;
use crate::core::widget::WidgetRow;
use crate::logging::HubLogEvent;
use crate::logging::HubLogSink;
use crate::logging::LogLevel;
use crate::logging::NoopLogSink;
use crate::runtime::snapshot::WidgetSnapshotCache;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of a seed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The snapshot was written with this many rows.
    Written(usize),
    /// The result was not fresh.
    NotFresh,
    /// The fresh result carried no rows.
    NoRows,
    /// No owner was resolvable.
    NoOwner,
    /// This seeder already seeded.
    AlreadySeeded,
    /// The write failed; the failure was logged.
    WriteFailed,
}

/// At-most-once snapshot writer.
pub struct CacheSeeder {
    /// Snapshot cache written to.
    cache: WidgetSnapshotCache,
    /// Set once the seeder has claimed its single write.
    seeded: AtomicBool,
    /// Operator log sink.
    log: Arc<dyn HubLogSink>,
}

impl CacheSeeder {
    /// Creates a seeder for one mount.
    #[must_use]
    pub fn new(cache: WidgetSnapshotCache) -> Self {
        Self {
            cache,
            seeded: AtomicBool::new(false),
            log: Arc::new(NoopLogSink),
        }
    }

    /// Replaces the operator log sink.
    #[must_use]
    pub fn with_log_sink(mut self, log: Arc<dyn HubLogSink>) -> Self {
        self.log = log;
        self
    }

    /// Returns true once the seeder has claimed its write.
    #[must_use]
    pub fn has_seeded(&self) -> bool {
        self.seeded.load(Ordering::Acquire)
    }

    /// Writes the fresh rows of `resolution` for `owner` if eligible.
    pub fn seed(&self, resolution: &ListResolution, owner: Option<&OwnerId>) -> SeedOutcome {
        let ListResolution::Fresh {
            rows, ..
        } = resolution
        else {
            return SeedOutcome::NotFresh;
        };
        self.seed_rows(rows, owner)
    }

    /// Writes `rows` for `owner` if eligible.
    pub fn seed_rows(&self, rows: &[WidgetRow], owner: Option<&OwnerId>) -> SeedOutcome {
        if rows.is_empty() {
            return SeedOutcome::NoRows;
        }
        let Some(owner) = owner.filter(|owner| !owner.is_blank()) else {
            return SeedOutcome::NoOwner;
        };
        if self.seeded.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err()
        {
            return SeedOutcome::AlreadySeeded;
        }
        let slim: Vec<_> = rows.iter().map(WidgetRow::slim).collect();
        match self.cache.write(owner, &slim) {
            Ok(()) => SeedOutcome::Written(slim.len()),
            Err(err) => {
                self.log.record(
                    &HubLogEvent::new("snapshot_seed_failed", LogLevel::Warn, err.to_string())
                        .with_owner(owner.as_str()),
                );
                SeedOutcome::WriteFailed
            }
        }
    }
}
