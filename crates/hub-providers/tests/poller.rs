// crates/hub-providers/tests/poller.rs
// ============================================================================
// Module: Widget Poller Tests
// Description: Poll loop timing, error handling, and teardown.
// Purpose: Validate poller state transitions on tokio's paused clock.
// Dependencies: hub-providers, tokio
// ============================================================================

//! Widget poller tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use hub_core::FetchError;
use hub_core::HubLogSink;
use hub_core::InstanceId;
use hub_core::KindFetcher;
use hub_core::MemoryLogSink;
use hub_core::WidgetKind;
use hub_providers::KindEntry;
use hub_providers::KindRegistry;
use hub_providers::POLL_ERROR_MESSAGE;
use hub_providers::PollState;
use hub_providers::WidgetPoller;
use hub_providers::WidgetPollers;

use crate::common::GatedFetcher;
use crate::common::ScriptedFetcher;
use crate::common::countdown_data;
use crate::common::widget;

const INTERVAL: Duration = Duration::from_secs(30);

fn registry_with(kind: WidgetKind, fetcher: Arc<dyn KindFetcher>) -> KindRegistry {
    let mut registry = KindRegistry::new();
    registry.register(kind, KindEntry::new(fetcher, INTERVAL));
    registry
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn first_fetch_moves_loading_to_success() {
    let fetcher = ScriptedFetcher::new(vec![Ok(countdown_data("2026-11-01T00:00:00Z"))]);
    let registry = registry_with(WidgetKind::Countdown, fetcher.clone());

    let handle = WidgetPoller::new(widget("c1", "countdown"), &registry).spawn();
    assert_eq!(handle.state(), PollState::Loading);
    assert_eq!(handle.widget_key(), "countdown:c1");

    let mut states = handle.subscribe();
    states.changed().await.unwrap();
    let PollState::Success(snapshot) = handle.state() else {
        panic!("expected success");
    };
    assert_eq!(snapshot.data, countdown_data("2026-11-01T00:00:00Z"));
    assert_eq!(snapshot.view.title, "Widget c1");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn next_fetch_waits_for_interval() {
    let fetcher = ScriptedFetcher::new(vec![Ok(countdown_data("a"))]);
    let registry = registry_with(WidgetKind::Countdown, fetcher.clone());
    let _handle = WidgetPoller::new(widget("c1", "countdown"), &registry).spawn();

    settle().await;
    assert_eq!(fetcher.calls(), 1);
    tokio::time::sleep(INTERVAL - Duration::from_secs(1)).await;
    assert_eq!(fetcher.calls(), 1);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fetcher.calls(), 2);
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn failures_publish_generic_message_and_log_detail() {
    let fetcher = ScriptedFetcher::new(vec![Err(FetchError::Status {
        status: 502,
        body: "upstream refused: secret-host:9000".to_string(),
    })]);
    let registry = registry_with(WidgetKind::Countdown, fetcher.clone());
    let log = Arc::new(MemoryLogSink::new());
    let sink: Arc<dyn HubLogSink> = log.clone();

    let handle = WidgetPoller::new(widget("c1", "countdown"), &registry).with_log_sink(sink).spawn();
    settle().await;

    assert_eq!(
        handle.state(),
        PollState::Error {
            message: POLL_ERROR_MESSAGE.to_string(),
        }
    );
    let events = log.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "widget_fetch_failed");
    assert_eq!(events[0].widget_key.as_deref(), Some("countdown:c1"));
    assert!(events[0].message.contains("502"));
}

#[tokio::test(start_paused = true)]
async fn failure_retries_after_same_interval_and_recovers() {
    let fetcher = ScriptedFetcher::new(vec![
        Err(FetchError::Timeout("slow".to_string())),
        Ok(countdown_data("b")),
    ]);
    let registry = registry_with(WidgetKind::Countdown, fetcher.clone());
    let handle = WidgetPoller::new(widget("c1", "countdown"), &registry).spawn();

    settle().await;
    assert_eq!(handle.state().label(), "error");
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(handle.state().label(), "success");
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_scheduled_fetches() {
    let fetcher = ScriptedFetcher::new(vec![Ok(countdown_data("a"))]);
    let registry = registry_with(WidgetKind::Countdown, fetcher.clone());
    let handle = WidgetPoller::new(widget("c1", "countdown"), &registry).spawn();

    settle().await;
    handle.cancel();
    settle().await;
    assert!(handle.is_cancelled());
    assert!(handle.is_finished());
    tokio::time::sleep(INTERVAL * 4).await;
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_response_after_cancel_is_discarded() {
    let fetcher = GatedFetcher::new(countdown_data("late"));
    let registry = registry_with(WidgetKind::Countdown, fetcher.clone());
    let handle = WidgetPoller::new(widget("c1", "countdown"), &registry).spawn();

    settle().await;
    assert_eq!(fetcher.calls(), 1);
    handle.cancel();
    fetcher.release();
    settle().await;

    assert_eq!(handle.state(), PollState::Loading);
    assert!(handle.is_finished());
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_cancels_loop() {
    let fetcher = ScriptedFetcher::new(vec![Ok(countdown_data("a"))]);
    let registry = registry_with(WidgetKind::Countdown, fetcher.clone());
    let handle = WidgetPoller::new(widget("c1", "countdown"), &registry).spawn();
    settle().await;
    drop(handle);
    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn unsupported_kind_publishes_placeholder_without_task() {
    let registry = KindRegistry::new();
    let log = Arc::new(MemoryLogSink::new());
    let sink: Arc<dyn HubLogSink> = log.clone();
    let handle = WidgetPoller::new(widget("w1", "weather"), &registry).with_log_sink(sink).spawn();

    let PollState::Unsupported {
        view,
    } = handle.state()
    else {
        panic!("expected unsupported");
    };
    assert!(view.unsupported);
    assert_eq!(view.lines, vec!["Widget type \"weather\" is not supported".to_string()]);
    assert!(handle.is_finished());
    assert_eq!(log.events()[0].event, "widget_kind_unsupported");
}

#[tokio::test(start_paused = true)]
async fn sync_spawns_cancels_and_respawns_on_kind_change() {
    let countdown = ScriptedFetcher::new(vec![Ok(countdown_data("a"))]);
    let pings = ScriptedFetcher::new(vec![Err(FetchError::Transport("refused".to_string()))]);
    let mut registry = KindRegistry::new();
    registry.register(WidgetKind::Countdown, KindEntry::new(countdown.clone(), INTERVAL));
    registry.register(WidgetKind::ServerPings, KindEntry::new(pings.clone(), INTERVAL));
    let mut pollers = WidgetPollers::new(Arc::new(registry));

    pollers.sync(&[widget("a", "countdown"), widget("b", "server-pings"), widget("c", "weather")]);
    settle().await;
    assert_eq!(pollers.len(), 3);
    assert_eq!(countdown.calls(), 1);
    assert_eq!(pings.calls(), 1);
    assert_eq!(pollers.get(&InstanceId::new("c")).unwrap().state().label(), "unsupported");

    pollers.sync(&[widget("a", "countdown"), widget("b", "countdown")]);
    settle().await;
    assert_eq!(pollers.len(), 2);
    assert!(pollers.get(&InstanceId::new("c")).is_none());
    assert_eq!(countdown.calls(), 2);
    let kinds: Vec<&str> = pollers.iter().map(|(_, handle)| handle.kind().as_str()).collect();
    assert_eq!(kinds, vec!["countdown", "countdown"]);

    tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;
    assert_eq!(pings.calls(), 1);
    assert_eq!(countdown.calls(), 4);

    pollers.sync(&[]);
    assert!(pollers.is_empty());
    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(countdown.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn unchanged_widgets_keep_their_poller() {
    let countdown = ScriptedFetcher::new(vec![Ok(countdown_data("a"))]);
    let registry = registry_with(WidgetKind::Countdown, countdown.clone());
    let mut pollers = WidgetPollers::new(Arc::new(registry));

    pollers.sync(&[widget("a", "countdown")]);
    settle().await;
    pollers.sync(&[widget("a", "countdown")]);
    settle().await;
    assert_eq!(countdown.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_widgets_poll_stale_and_respawn_when_fresh() {
    let countdown = ScriptedFetcher::new(vec![Ok(countdown_data("a"))]);
    let registry = registry_with(WidgetKind::Countdown, countdown.clone());
    let mut pollers = WidgetPollers::new(Arc::new(registry));
    let key = InstanceId::new("a");

    pollers.sync(&[widget("a", "countdown").into_stale()]);
    settle().await;
    let handle = pollers.get(&key).unwrap();
    assert!(handle.is_stale());
    let PollState::Success(snapshot) = handle.state() else {
        panic!("expected success");
    };
    assert!(snapshot.view.stale);

    pollers.sync(&[widget("a", "countdown")]);
    settle().await;
    assert_eq!(countdown.calls(), 2);
    let handle = pollers.get(&key).unwrap();
    assert!(!handle.is_stale());
    let PollState::Success(snapshot) = handle.state() else {
        panic!("expected success");
    };
    assert!(!snapshot.view.stale);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancel_racing_a_completing_fetch_freezes_state() {
    for _ in 0..32 {
        let fetcher = GatedFetcher::new(countdown_data("race"));
        let registry = registry_with(WidgetKind::Countdown, fetcher.clone());
        let handle = WidgetPoller::new(widget("c1", "countdown"), &registry).spawn();
        while fetcher.calls() == 0 {
            tokio::task::yield_now().await;
        }

        let releaser = {
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move { fetcher.release() })
        };
        handle.cancel();
        let frozen = handle.state();
        releaser.await.unwrap();
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;

        assert_eq!(handle.state(), frozen);
        assert_eq!(fetcher.calls(), 1);
    }
}
