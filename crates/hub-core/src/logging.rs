// crates/hub-core/src/logging.rs
// ============================================================================
// Module: Operator Logging
// Description: Structured operator log events and sinks.
// Purpose: Keep failure detail on an operator channel, away from users.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! User-visible failures are always short, calm messages; the full detail of
//! every failure goes here instead. Sinks write one JSON object per line so
//! deployments can route events to their own pipeline. [`WarnOnce`] throttles
//! repeated warnings for the same key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Default window during which a repeated warning is suppressed.
pub const WARN_ONCE_WINDOW: Duration = Duration::from_secs(60);

/// Severity of an operator event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Routine state change.
    Info,
    /// Degraded but recovered behavior.
    Warn,
    /// Failure surfaced to a user as an error state.
    Error,
}

/// Operator log event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubLogEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event severity.
    pub level: LogLevel,
    /// Owner the event concerns, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// `<kind>:<instanceId>` key of the widget concerned, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_key: Option<String>,
    /// Full detail for operators.
    pub message: String,
}

impl HubLogEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(event: &'static str, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            event,
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|duration| duration.as_millis())
                .unwrap_or_default(),
            level,
            owner_id: None,
            widget_key: None,
            message: message.into(),
        }
    }

    /// Attaches the owner identifier.
    #[must_use]
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Attaches the widget key.
    #[must_use]
    pub fn with_widget(mut self, widget_key: impl Into<String>) -> Self {
        self.widget_key = Some(widget_key.into());
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for operator events.
pub trait HubLogSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &HubLogEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrLogSink;

impl HubLogSink for StderrLogSink {
    fn record(&self, event: &HubLogEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileLogSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileLogSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl HubLogSink for FileLogSink {
    fn record(&self, event: &HubLogEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op sink.
pub struct NoopLogSink;

impl HubLogSink for NoopLogSink {
    fn record(&self, _event: &HubLogEvent) {}
}

/// Sink that keeps events in memory for inspection.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogSink {
    /// Recorded events in arrival order.
    events: Arc<Mutex<Vec<HubLogEvent>>>,
}

impl MemoryLogSink {
    /// Creates an empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HubLogEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl HubLogSink for MemoryLogSink {
    fn record(&self, event: &HubLogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

// ============================================================================
// SECTION: Rate Limiting
// ============================================================================

/// Forwards events to an inner sink, dropping repeated warnings of the same
/// key that arrive within the suppression window. Other levels always pass.
pub struct WarnOnce {
    /// Destination for forwarded events.
    inner: Arc<dyn HubLogSink>,
    /// Suppression window.
    window: Duration,
    /// Last forward time per key.
    last_seen: Mutex<BTreeMap<String, u128>>,
}

impl WarnOnce {
    /// Wraps a sink with the default sixty-second window.
    #[must_use]
    pub fn new(inner: Arc<dyn HubLogSink>) -> Self {
        Self::with_window(inner, WARN_ONCE_WINDOW)
    }

    /// Wraps a sink with a custom window.
    #[must_use]
    pub fn with_window(inner: Arc<dyn HubLogSink>, window: Duration) -> Self {
        Self {
            inner,
            window,
            last_seen: Mutex::new(BTreeMap::new()),
        }
    }

    /// Records `event` unless `key` was forwarded within the window.
    /// Returns true when the event was forwarded.
    pub fn record_keyed(&self, key: &str, event: &HubLogEvent) -> bool {
        let Ok(mut last_seen) = self.last_seen.lock() else {
            return false;
        };
        let now = event.timestamp_ms;
        if let Some(previous) = last_seen.get(key)
            && now.saturating_sub(*previous) < self.window.as_millis()
        {
            return false;
        }
        last_seen.insert(key.to_string(), now);
        drop(last_seen);
        self.inner.record(event);
        true
    }
}

impl HubLogSink for WarnOnce {
    fn record(&self, event: &HubLogEvent) {
        if event.level != LogLevel::Warn {
            self.inner.record(event);
            return;
        }
        let key = format!(
            "{}:{}",
            event.event,
            event.widget_key.as_deref().or(event.owner_id.as_deref()).unwrap_or_default()
        );
        let _ = self.record_keyed(&key, event);
    }
}
