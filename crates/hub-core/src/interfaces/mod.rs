// crates/hub-core/src/interfaces/mod.rs
// ============================================================================
// Module: Widget Hub Interfaces
// Description: Contracts for snapshot storage, sessions, and backend fetches.
// Purpose: Define the collaborator surfaces used by the hub runtime.
// Dependencies: async-trait, crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the hub reaches its collaborators without embedding
//! transport or storage details. The list source reports structured failures
//! so offline classification does not depend on message wording; untyped
//! failures still fall back to keyword matching.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::data::KindData;
use crate::core::identifiers::InstanceId;
use crate::core::widget::WidgetRow;
use crate::runtime::offline::is_offline_message;

// ============================================================================
// SECTION: Snapshot Store
// ============================================================================

/// Stored snapshot record.
///
/// # Invariants
/// - `expires_at_ms` is strictly greater than `written_at_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    /// Serialized snapshot payload.
    pub payload: Vec<u8>,
    /// Write time (milliseconds since epoch).
    pub written_at_ms: i64,
    /// Expiration time (milliseconds since epoch).
    pub expires_at_ms: i64,
}

/// Snapshot store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("snapshot store io error: {0}")]
    Io(String),
    /// Store backend error.
    #[error("snapshot store error: {0}")]
    Store(String),
    /// Store data is corrupted.
    #[error("snapshot store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("snapshot store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("snapshot store invalid data: {0}")]
    Invalid(String),
}

/// Owner-keyed persistence for widget snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Loads the record stored under `key`, treating records expired at
    /// `now_ms` as absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, key: &str, now_ms: i64) -> Result<Option<StoredSnapshot>, StoreError>;

    /// Overwrites the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save(&self, key: &str, snapshot: &StoredSnapshot) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Bearer credential for backend calls. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token; blank tokens are rejected.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() { None } else { Some(Self(token)) }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Current-session lookup backed by the auth provider.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the bearer token of the current session, if any.
    async fn bearer_token(&self) -> Option<BearerToken>;
}

// ============================================================================
// SECTION: Widget List Source
// ============================================================================

/// Widget list fetch failures.
///
/// # Invariants
/// - Variants are stable for offline classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListSourceError {
    /// No session credential was available; no request was made.
    #[error("no session token available")]
    Unauthenticated,
    /// The request exceeded its timeout.
    #[error("widget list request timed out: {0}")]
    Timeout(String),
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The backend host could not be resolved.
    #[error("dns lookup failed: {0}")]
    Dns(String),
    /// The backend answered with a non-success status.
    #[error("backend returned {status}{}", status_suffix(.body))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },
    /// The response body was not a widget list.
    #[error("malformed widget list: {0}")]
    Malformed(String),
    /// The backend address or client is misconfigured.
    #[error("backend configuration error: {0}")]
    Config(String),
    /// Untyped failure reported by a collaborator.
    #[error("{0}")]
    Other(String),
}

impl ListSourceError {
    /// Returns true when the failure indicates the backend is unreachable.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connect(_) | Self::Dns(_) => true,
            Self::Status {
                status, ..
            } => (500..=599).contains(status),
            Self::Unauthenticated | Self::Malformed(_) | Self::Config(_) => false,
            Self::Other(message) => is_offline_message(message),
        }
    }
}

/// Formats the optional body suffix of a status error.
fn status_suffix(body: &str) -> String {
    if body.is_empty() { String::new() } else { format!(" - {body}") }
}

/// Authoritative source of a user's widget rows.
#[async_trait]
pub trait WidgetListSource: Send + Sync {
    /// Fetches the widget rows visible to the credential.
    ///
    /// # Errors
    ///
    /// Returns [`ListSourceError`] when the list cannot be fetched.
    async fn fetch_list(&self, token: &BearerToken) -> Result<Vec<WidgetRow>, ListSourceError>;
}

// ============================================================================
// SECTION: Kind Fetcher
// ============================================================================

/// Per-kind data fetch failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No session credential was available.
    #[error("no session token available")]
    Unauthenticated,
    /// The request exceeded its timeout.
    #[error("widget data request timed out: {0}")]
    Timeout(String),
    /// The request could not be sent or the body could not be read.
    #[error("widget data transport error: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("widget data request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },
    /// The payload did not match the kind's data shape.
    #[error("widget data decode error: {0}")]
    Decode(String),
}

/// Fetcher for one widget kind's data endpoint.
#[async_trait]
pub trait KindFetcher: Send + Sync {
    /// Fetches data for a widget instance.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the data cannot be fetched or decoded.
    async fn fetch(&self, instance_id: &InstanceId) -> Result<KindData, FetchError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock source in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds.
    fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
    }
}
