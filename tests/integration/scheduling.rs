//! Integration tests for a single target scheduler
//!
//! These tests run on a paused clock so that tick times are exact:
//! - the first probe happens right away, the second one interval later
//! - cadence does not drift over many ticks
//! - slow probes delay the next tick and never overlap
//! - Down results never stop the loop

use std::sync::Arc;
use std::time::Duration;

use pulse::actors::scheduler::{SchedulerContext, SchedulerHandle};
use pulse::config::TargetConfig;
use pulse::{EffectiveSchedule, ProbeStatus, SchedulerState, Target, shutdown_channel};
use tokio::time::Instant;

use crate::helpers::*;

fn spawn_scheduler(
    probe: Arc<MockProbe>,
    sink: Arc<CollectingSink>,
    interval: Duration,
) -> (SchedulerHandle, pulse::ShutdownTrigger) {
    let (trigger, shutdown) = shutdown_channel();
    let target =
        Target::from_config(&TargetConfig::new("http://api.test/health").with_name("api")).unwrap();

    let handle = SchedulerHandle::spawn(
        Arc::new(target),
        EffectiveSchedule {
            interval,
            timeout: Duration::from_secs(1),
        },
        SchedulerContext {
            probe,
            sink,
            shutdown,
        },
    );

    (handle, trigger)
}

#[tokio::test(start_paused = true)]
async fn test_second_probe_after_one_interval() {
    let probe = Arc::new(MockProbe::new());
    let sink = Arc::new(CollectingSink::default());
    let start = Instant::now();

    let (handle, trigger) = spawn_scheduler(probe.clone(), sink.clone(), Duration::from_secs(15));

    tokio::time::sleep(Duration::from_secs(16)).await;
    trigger.trigger();
    handle.join().await.unwrap();

    let calls = probe.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].started, start);
    assert_eq!(calls[1].started - calls[0].started, Duration::from_secs(15));
    assert_eq!(calls[0].timeout, Duration::from_secs(1));
    assert_eq!(sink.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_drift_over_many_ticks() {
    let probe = Arc::new(MockProbe::with_delay(Duration::from_millis(300)));
    let sink = Arc::new(CollectingSink::default());
    let start = Instant::now();

    let (handle, trigger) = spawn_scheduler(probe.clone(), sink.clone(), Duration::from_secs(1));

    tokio::time::sleep(Duration::from_millis(100_500)).await;
    trigger.trigger();
    handle.join().await.unwrap();

    let calls = probe.calls();
    assert_eq!(calls.len(), 101);
    // tick n fires at start + n seconds even though every probe takes 300ms
    assert_eq!(calls[100].started - start, Duration::from_secs(100));
}

#[tokio::test(start_paused = true)]
async fn test_slow_probe_delays_next_tick_without_burst() {
    let probe = Arc::new(MockProbe::with_delay(Duration::from_secs(25)));
    let sink = Arc::new(CollectingSink::default());

    let (handle, trigger) = spawn_scheduler(probe.clone(), sink.clone(), Duration::from_secs(10));

    tokio::time::sleep(Duration::from_secs(80)).await;
    trigger.trigger();
    handle.join().await.unwrap();

    let calls = probe.calls();
    assert!(calls.len() >= 3, "expected at least 3 probes, got {}", calls.len());
    for pair in calls.windows(2) {
        assert!(
            pair[1].started - pair[0].started >= Duration::from_secs(25),
            "probes must not overlap or burst"
        );
    }
    assert_eq!(probe.max_in_flight(), 1);
    assert_eq!(sink.count(), calls.len());
}

#[tokio::test(start_paused = true)]
async fn test_down_results_keep_loop_running() {
    let probe = Arc::new(MockProbe::new().returning(ProbeStatus::Down));
    let sink = Arc::new(CollectingSink::default());

    let (handle, trigger) = spawn_scheduler(probe.clone(), sink.clone(), Duration::from_secs(5));

    tokio::time::sleep(Duration::from_secs(22)).await;
    assert_eq!(handle.state(), SchedulerState::Running);
    trigger.trigger();
    handle.join().await.unwrap();

    let results = sink.results();
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.status == ProbeStatus::Down));
    assert!(results.iter().all(|r| r.error.is_some()));
}

#[tokio::test(start_paused = true)]
async fn test_results_are_emitted_in_probe_order() {
    let probe = Arc::new(MockProbe::new());
    let sink = Arc::new(CollectingSink::default());

    let (handle, trigger) = spawn_scheduler(probe.clone(), sink.clone(), Duration::from_secs(1));

    tokio::time::sleep(Duration::from_millis(9_500)).await;
    trigger.trigger();
    handle.join().await.unwrap();

    let results = sink.results();
    assert_eq!(results.len(), 10);
    for pair in results.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[tokio::test(start_paused = true)]
async fn test_no_probe_after_shutdown() {
    let probe = Arc::new(MockProbe::new());
    let sink = Arc::new(CollectingSink::default());

    let (handle, trigger) = spawn_scheduler(probe.clone(), sink.clone(), Duration::from_secs(10));

    tokio::time::sleep(Duration::from_secs(15)).await;
    trigger.trigger();
    handle.join().await.unwrap();
    let emitted = sink.count();

    tokio::time::sleep(Duration::from_secs(100)).await;

    assert_eq!(emitted, 2);
    assert_eq!(sink.count(), emitted);
}
