// crates/hub-providers/src/poller.rs
// ============================================================================
// Module: Widget Poller
// Description: Per-instance refresh loops and their owning collection.
// Purpose: Keep each widget's data current with cancellable tasks.
// Dependencies: hub-core, serde, tokio
// ============================================================================

//! ## Overview
//! A [`WidgetPoller`] runs one loop per widget instance: fetch, publish the
//! resulting [`PollState`], sleep for the kind's interval, repeat. Failures
//! publish a generic message while the full error goes to the operator log,
//! and the next attempt runs after the same interval.
//!
//! Teardown goes through [`PollHandle`]. Cancelling (or dropping) a handle
//! wakes a sleeping loop immediately and raises a dead flag that discards
//! any response still in flight, so no state is published afterwards. The
//! flag is checked again under the state channel's write lock, which makes
//! the final check and the publish atomic with respect to cancellation.
//! In-flight requests are not aborted.
//!
//! [`WidgetPollers`] keeps one handle per instance and reconciles the set
//! against the current widget list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use hub_core::HubLogEvent;
use hub_core::HubLogSink;
use hub_core::InstanceId;
use hub_core::KindData;
use hub_core::KindTag;
use hub_core::LogLevel;
use hub_core::NoopLogSink;
use hub_core::WarnOnce;
use hub_core::Widget;
use hub_core::WidgetView;
use hub_core::render_unsupported;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::registry::KindEntry;
use crate::registry::KindLookup;
use crate::registry::KindRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// User-facing message for a failed fetch.
pub const POLL_ERROR_MESSAGE: &str = "Service temporarily unavailable";

// ============================================================================
// SECTION: State
// ============================================================================

/// Data and rendered view of a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollSnapshot {
    /// Decoded kind data.
    pub data: KindData,
    /// Rendered view.
    pub view: WidgetView,
}

/// Observable state of one poller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollState {
    /// No fetch has completed yet.
    Loading,
    /// The latest fetch succeeded.
    Success(PollSnapshot),
    /// The latest fetch failed.
    Error {
        /// User-safe message.
        message: String,
    },
    /// The widget kind has no registry entry; nothing is polled.
    Unsupported {
        /// Placeholder view.
        view: WidgetView,
    },
}

impl PollState {
    /// Returns the state label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error {
                ..
            } => "error",
            Self::Unsupported {
                ..
            } => "unsupported",
        }
    }
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Owner of one running poller. Dropping the handle cancels the poller.
#[derive(Debug)]
pub struct PollHandle {
    /// Widget key (`<kind>:<instanceId>`).
    widget_key: String,
    /// Kind the poller was started for.
    kind: KindTag,
    /// Whether the widget came from the snapshot cache.
    stale: bool,
    /// Set once the poller is cancelled.
    dead: Arc<AtomicBool>,
    /// Wakes a sleeping loop on cancel.
    cancel_tx: watch::Sender<bool>,
    /// Published state.
    state_rx: watch::Receiver<PollState>,
    /// Loop task; absent for unsupported kinds.
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Returns the widget key.
    #[must_use]
    pub fn widget_key(&self) -> &str {
        &self.widget_key
    }

    /// Returns the kind the poller was started for.
    #[must_use]
    pub const fn kind(&self) -> &KindTag {
        &self.kind
    }

    /// Returns true when the poller renders a cached widget.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> PollState {
        self.state_rx.borrow().clone()
    }

    /// Returns a receiver that observes state changes.
    ///
    /// For unsupported kinds the sender is already closed, so `changed()`
    /// returns an error immediately.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_rx.clone()
    }

    /// Returns true once the poller has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.dead.load(Ordering::SeqCst)
    }

    /// Returns true when the loop task has exited (or never ran).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancels the poller. Idempotent.
    ///
    /// The dead flag is raised while holding the state channel's read lock.
    /// A publish runs under the write lock and re-checks the flag, so once
    /// this returns no further state can land.
    pub fn cancel(&self) {
        {
            let _state = self.state_rx.borrow();
            self.dead.store(true, Ordering::SeqCst);
        }
        let _ = self.cancel_tx.send(true);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// SECTION: Poller
// ============================================================================

/// Refresh loop for one widget instance.
pub struct WidgetPoller {
    /// Widget being polled.
    widget: Widget,
    /// Registry lookup result; `None` for unsupported kinds.
    entry: Option<KindEntry>,
    /// Operator log sink.
    log: Arc<dyn HubLogSink>,
}

impl WidgetPoller {
    /// Creates a poller for `widget` using the registry entry for its kind.
    #[must_use]
    pub fn new(widget: Widget, registry: &KindRegistry) -> Self {
        let entry = match registry.lookup(&widget.kind) {
            KindLookup::Supported(entry) => Some(entry.clone()),
            KindLookup::Unsupported(_) => None,
        };
        Self {
            widget,
            entry,
            log: Arc::new(NoopLogSink),
        }
    }

    /// Replaces the operator log sink.
    #[must_use]
    pub fn with_log_sink(mut self, log: Arc<dyn HubLogSink>) -> Self {
        self.log = log;
        self
    }

    /// Starts the loop on the current tokio runtime.
    ///
    /// Unsupported kinds publish their placeholder once and start no task.
    #[must_use]
    pub fn spawn(self) -> PollHandle {
        let widget_key = self.widget.widget_key();
        let kind = self.widget.kind.clone();
        let stale = self.widget.stale;
        let dead = Arc::new(AtomicBool::new(false));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let Some(entry) = self.entry else {
            self.log.record(
                &HubLogEvent::new(
                    "widget_kind_unsupported",
                    LogLevel::Warn,
                    format!("no registry entry for kind {kind}"),
                )
                .with_widget(widget_key.clone()),
            );
            let (_, state_rx) = watch::channel(PollState::Unsupported {
                view: render_unsupported(&self.widget),
            });
            return PollHandle {
                widget_key,
                kind,
                stale,
                dead,
                cancel_tx,
                state_rx,
                task: None,
            };
        };
        let (state_tx, state_rx) = watch::channel(PollState::Loading);
        let task = tokio::spawn(run_loop(
            self.widget,
            entry,
            self.log,
            Arc::clone(&dead),
            state_tx,
            cancel_rx,
        ));
        PollHandle {
            widget_key,
            kind,
            stale,
            dead,
            cancel_tx,
            state_rx,
            task: Some(task),
        }
    }
}

/// Fetch, publish, and sleep until cancelled.
async fn run_loop(
    widget: Widget,
    entry: KindEntry,
    log: Arc<dyn HubLogSink>,
    dead: Arc<AtomicBool>,
    state_tx: watch::Sender<PollState>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let widget_key = widget.widget_key();
    loop {
        let result = entry.fetcher.fetch(&widget.instance_id).await;
        if dead.load(Ordering::SeqCst) {
            return;
        }
        let next = match result {
            Ok(data) => {
                let view = (entry.render)(&data, &widget);
                PollState::Success(PollSnapshot {
                    data,
                    view,
                })
            }
            Err(err) => {
                log.record(
                    &HubLogEvent::new("widget_fetch_failed", LogLevel::Warn, err.to_string())
                        .with_widget(widget_key.clone()),
                );
                PollState::Error {
                    message: POLL_ERROR_MESSAGE.to_string(),
                }
            }
        };
        let published = state_tx.send_if_modified(|state| {
            if dead.load(Ordering::SeqCst) {
                return false;
            }
            *state = next;
            true
        });
        if !published {
            return;
        }
        tokio::select! {
            () = tokio::time::sleep(entry.poll_interval) => {}
            _ = cancel_rx.changed() => return,
        }
        if dead.load(Ordering::SeqCst) {
            return;
        }
    }
}

// ============================================================================
// SECTION: Collection
// ============================================================================

/// One poller per widget instance, reconciled against the widget list.
pub struct WidgetPollers {
    /// Kind registry shared by every poller.
    registry: Arc<KindRegistry>,
    /// Rate-limited operator sink shared by every poller.
    log: Arc<dyn HubLogSink>,
    /// Running handles keyed by instance.
    handles: BTreeMap<InstanceId, PollHandle>,
}

impl WidgetPollers {
    /// Creates an empty collection.
    #[must_use]
    pub fn new(registry: Arc<KindRegistry>) -> Self {
        Self {
            registry,
            log: Arc::new(NoopLogSink),
            handles: BTreeMap::new(),
        }
    }

    /// Routes poller events to `sink`, suppressing repeats per widget.
    #[must_use]
    pub fn with_log_sink(mut self, sink: Arc<dyn HubLogSink>) -> Self {
        self.log = Arc::new(WarnOnce::new(sink));
        self
    }

    /// Reconciles running pollers with `widgets`.
    ///
    /// New instances are spawned, vanished instances are cancelled, and an
    /// instance whose kind or cache origin changed is cancelled and
    /// respawned. Others keep running untouched.
    pub fn sync(&mut self, widgets: &[Widget]) {
        let mut next: BTreeMap<InstanceId, PollHandle> = BTreeMap::new();
        for widget in widgets {
            if next.contains_key(&widget.instance_id) {
                continue;
            }
            let handle = match self.handles.remove(&widget.instance_id) {
                Some(handle)
                    if handle.kind() == &widget.kind && handle.is_stale() == widget.stale =>
                {
                    handle
                }
                previous => {
                    if let Some(previous) = previous {
                        previous.cancel();
                    }
                    WidgetPoller::new(widget.clone(), &self.registry)
                        .with_log_sink(Arc::clone(&self.log))
                        .spawn()
                }
            };
            next.insert(widget.instance_id.clone(), handle);
        }
        for handle in self.handles.values() {
            handle.cancel();
        }
        self.handles = next;
    }

    /// Returns the handle for an instance.
    #[must_use]
    pub fn get(&self, instance_id: &InstanceId) -> Option<&PollHandle> {
        self.handles.get(instance_id)
    }

    /// Iterates handles in instance order.
    pub fn iter(&self) -> impl Iterator<Item = (&InstanceId, &PollHandle)> {
        self.handles.iter()
    }

    /// Returns the number of running handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true when no handle is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancels and removes every handle.
    pub fn shutdown(&mut self) {
        for handle in self.handles.values() {
            handle.cancel();
        }
        self.handles.clear();
    }
}

impl Drop for WidgetPollers {
    fn drop(&mut self) {
        self.shutdown();
    }
}
