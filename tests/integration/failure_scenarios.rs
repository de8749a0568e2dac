//! Failure tests for the monitor
//!
//! These tests verify that failures stay local to a target:
//! - unreachable targets are reported as Down on every tick
//! - a target bounded by its timeout does not hold back other targets
//! - a crashing scheduler does not prevent a clean shutdown

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pulse::config::TargetConfig;
use pulse::{MonitorSettings, Probe, ProbeResult, ProbeStatus, Target, shutdown_channel};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_unreachable_target_reported_every_tick() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let sink = Arc::new(CollectingSink::default());
    let monitor = pulse::Monitor::new(MonitorSettings::default())
        .unwrap()
        .with_sink(sink.clone());

    let targets = vec![
        TargetConfig::new(format!("http://127.0.0.1:{port}/health"))
            .with_name("offline")
            .with_interval("50ms")
            .with_timeout("1s"),
    ];

    let (trigger, shutdown) = shutdown_channel();
    let run = tokio::spawn(async move { monitor.run(&targets, shutdown).await });

    tokio::time::sleep(Duration::from_millis(300)).await;
    trigger.trigger();
    run.await.unwrap().unwrap();

    let results = sink.results();
    assert!(results.len() >= 3, "expected repeated reports, got {}", results.len());
    for result in results {
        assert_eq!(result.status, ProbeStatus::Down);
        assert_eq!(result.http_status_code, None);
        assert!(result.error.is_some_and(|e| !e.is_empty()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_target_does_not_block_others() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let sink = Arc::new(CollectingSink::default());
    let monitor = pulse::Monitor::new(MonitorSettings::default())
        .unwrap()
        .with_sink(sink.clone());

    let targets = vec![
        TargetConfig::new(format!("{}/slow", mock_server.uri()))
            .with_name("slow")
            .with_interval("100ms")
            .with_timeout("200ms"),
        TargetConfig::new(format!("{}/fast", mock_server.uri()))
            .with_name("fast")
            .with_interval("100ms"),
    ];

    let (trigger, shutdown) = shutdown_channel();
    let run = tokio::spawn(async move { monitor.run(&targets, shutdown).await });

    tokio::time::sleep(Duration::from_millis(650)).await;
    trigger.trigger();
    tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("run should return within one probe timeout")
        .unwrap()
        .unwrap();

    assert!(sink.count_for("fast") >= 4);

    let slow: Vec<ProbeResult> = sink
        .results()
        .into_iter()
        .filter(|result| result.target_name == "slow")
        .collect();
    assert!(!slow.is_empty());
    assert!(slow.iter().all(|result| result.status == ProbeStatus::Down));
    assert!(slow.iter().all(|result| result.latency >= Duration::from_millis(200)));
}

/// Probe that panics for the target named "crash"
struct CrashingProbe {
    inner: MockProbe,
}

#[async_trait]
impl Probe for CrashingProbe {
    async fn probe(&self, target: &Target, timeout: Duration) -> ProbeResult {
        if target.name == "crash" {
            panic!("probe crashed");
        }
        self.inner.probe(target, timeout).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_crashed_scheduler_does_not_block_shutdown() {
    let sink = Arc::new(CollectingSink::default());
    let monitor = pulse::Monitor::new(MonitorSettings::default())
        .unwrap()
        .with_probe(Arc::new(CrashingProbe {
            inner: MockProbe::new(),
        }))
        .with_sink(sink.clone());

    let targets = vec![
        create_test_target("crash", Some("1s")),
        create_test_target("steady", Some("1s")),
    ];

    let (trigger, shutdown) = shutdown_channel();
    let run = tokio::spawn(async move { monitor.run(&targets, shutdown).await });

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    trigger.trigger();
    run.await.unwrap().unwrap();

    assert_eq!(sink.count_for("crash"), 0);
    assert_eq!(sink.count_for("steady"), 4);
}
