// crates/hub-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Snapshot Store
// Description: Process-local snapshot store for tests and short-lived tools.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory [`SnapshotStore`] that honors the same
//! expiration contract as the durable store. It is not intended for
//! production use because snapshots do not survive a restart.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::SnapshotStore;
use crate::interfaces::StoreError;
use crate::interfaces::StoredSnapshot;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory snapshot store.
#[derive(Debug, Default, Clone)]
pub struct InMemorySnapshotStore {
    /// Snapshot map protected by a mutex.
    records: Arc<Mutex<BTreeMap<String, StoredSnapshot>>>,
}

impl InMemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw record, bypassing the snapshot cache encoding.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn insert_raw(&self, key: &str, snapshot: StoredSnapshot) -> Result<(), StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Store("snapshot store mutex poisoned".to_string()))?
            .insert(key.to_string(), snapshot);
        Ok(())
    }

    /// Returns the number of stored records, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or_default()
    }

    /// Returns true when no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self, key: &str, now_ms: i64) -> Result<Option<StoredSnapshot>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Store("snapshot store mutex poisoned".to_string()))?;
        Ok(guard.get(key).filter(|record| record.expires_at_ms > now_ms).cloned())
    }

    fn save(&self, key: &str, snapshot: &StoredSnapshot) -> Result<(), StoreError> {
        self.insert_raw(key, snapshot.clone())
    }
}
