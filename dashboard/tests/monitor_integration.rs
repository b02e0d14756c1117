//! System stats polling and the simulated fallback

mod common;

use common::fixtures::*;
use dashboard::model::StatsSource;
use dashboard::monitor::SystemMonitor;
use dashboard::{DemoConfig, HttpServiceApi, Notifier, SystemStats, ToastLevel};
use std::sync::Arc;

fn live_stats() -> SystemStats {
    SystemStats {
        cpu: 12.5,
        memory: 48.0,
        disk: 71.0,
        wifi: false,
        ethernet: true,
        hostname: "nas".to_string(),
        uptime: 86_400,
    }
}

fn demo_config() -> DemoConfig {
    DemoConfig {
        seed: Some(11),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_failures_fall_back_within_bounds() {
    let mock = MockApiServer::start().await;
    mock.mock_stats_failure().await;

    let notifier = Notifier::new();
    let mut toasts = notifier.subscribe();
    let api = Arc::new(HttpServiceApi::new(&mock.base_url).unwrap());
    let demo = demo_config();
    let monitor = SystemMonitor::new(Some(api), demo.clone(), 5, notifier);

    for _ in 0..2 {
        let sample = monitor.refresh().await;
        assert_eq!(sample.source, StatsSource::Simulated);
        assert!(sample.stats.cpu >= demo.cpu.min && sample.stats.cpu <= demo.cpu.max);
        assert!(sample.stats.memory >= demo.memory.min && sample.stats.memory <= demo.memory.max);
        assert!(sample.stats.disk >= demo.disk.min && sample.stats.disk <= demo.disk.max);
    }
    assert_eq!(monitor.consecutive_failures(), 2);

    // Only the first failure is announced
    let warnings = std::iter::from_fn(|| toasts.try_recv().ok())
        .filter(|t| t.level == ToastLevel::Warning)
        .count();
    assert_eq!(warnings, 1);
}

#[tokio::test]
async fn test_recovery_switches_back_to_live() {
    let mock = MockApiServer::start().await;
    mock.mock_stats_failure().await;

    let api = Arc::new(HttpServiceApi::new(&mock.base_url).unwrap());
    let monitor = SystemMonitor::new(Some(api), demo_config(), 5, Notifier::new());
    assert_eq!(monitor.refresh().await.source, StatsSource::Simulated);

    mock.server.reset().await;
    mock.mock_stats(&live_stats()).await;

    let sample = monitor.refresh().await;
    assert_eq!(sample.source, StatsSource::Live);
    assert_eq!(sample.stats, live_stats());
    assert_eq!(monitor.consecutive_failures(), 0);
    assert_eq!(monitor.latest().await.map(|s| s.source), Some(StatsSource::Live));
}

#[tokio::test]
async fn test_demo_mode_never_polls() {
    let monitor = SystemMonitor::new(None, demo_config(), 5, Notifier::new());
    let sample = monitor.refresh().await;
    assert_eq!(sample.source, StatsSource::Simulated);
    assert_eq!(sample.stats.hostname, "homeserver");
    assert_eq!(monitor.consecutive_failures(), 0);
}
