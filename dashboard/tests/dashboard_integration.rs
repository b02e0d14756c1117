//! Composition root in demo mode and against a mock API

mod common;

use common::fixtures::*;
use dashboard::interaction::{FixedAnswer, TourState};
use dashboard::stores::Preferences;
use dashboard::view::DataMode;
use dashboard::{CardConfig, Config, ConfigManager, Dashboard};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

async fn demo_dashboard(config: &TestConfig) -> Dashboard {
    std::env::remove_var(dashboard::config::manager::DEMO_MODE_ENV);
    let manager = ConfigManager::new(config.path_string()).await.unwrap();
    Dashboard::build(manager.get_current_config(), Arc::new(FixedAnswer(false)))
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn test_demo_dashboard_starts_and_persists() {
    let config = TestConfigBuilder::new()
        .demo_mode(true)
        .with_storage()
        .card("media", Some("jellyfin"))
        .build();

    {
        let mut dashboard = demo_dashboard(&config).await;
        dashboard.start().await;

        let catalog = dashboard.sync.catalog().await;
        assert_eq!(catalog.len(), 10);
        assert_eq!(dashboard.sync.banner().mode, DataMode::Demo);
        assert_eq!(
            dashboard.sync.container_for("media").await.as_deref(),
            Some("jellyfin")
        );
        assert!(dashboard.gestures.is_attached("media").await);
        assert!(!dashboard.gestures.is_attached("watchtower").await);

        assert!(dashboard.toggle_favorite("media").await.unwrap());
        assert_eq!(dashboard.preferences.get().await.favorites, vec!["media"]);
        // History is keyed by card id, not container
        assert!(dashboard.health.uptime_percent("media").await.is_some());
        assert!(dashboard.health.uptime_percent("jellyfin").await.is_none());

        let table = dashboard.service_manager().render().await;
        assert!(table.contains("Jellyfin"));

        let mut tour = dashboard.tour();
        assert!(tour.auto_start().await);
        tour.skip().await;
        assert_eq!(tour.state(), TourState::Skipped);

        dashboard.shutdown();
    }

    let restarted = demo_dashboard(&config).await;
    assert_eq!(restarted.favorites.list().await, vec!["media"]);
    assert!(restarted.preferences.get().await.tour_completed);
    assert!(!restarted.tour().auto_start().await);
}

#[tokio::test]
async fn test_demo_build_ignores_api_url() {
    let config = Config {
        api_base_url: "not a url".to_string(),
        demo_mode: true,
        ..Default::default()
    };
    // Demo mode skips the URL entirely
    let dashboard = Dashboard::build(Arc::new(config), Arc::new(FixedAnswer(false))).await;
    assert!(dashboard.is_ok());
}

fn live_config(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        demo_mode: false,
        poll_interval_seconds: 1,
        cards: vec![CardConfig {
            service_id: "media".to_string(),
            container: Some(services::JELLYFIN.to_string()),
            href: None,
        }],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_remote_favorites_survive_first_toggle() {
    let mock = MockApiServer::start().await;
    mock.mock_preferences(&Preferences {
        favorites: vec![services::JELLYFIN.to_string(), services::SONARR.to_string()],
        ..Default::default()
    })
    .await;

    let dashboard = Dashboard::build(
        Arc::new(live_config(&mock.base_url)),
        Arc::new(FixedAnswer(false)),
    )
    .await
    .unwrap();
    assert_eq!(
        dashboard.favorites.list().await,
        vec![services::JELLYFIN, services::SONARR]
    );

    assert!(dashboard.toggle_favorite(services::RADARR).await.unwrap());

    let expected = vec![
        services::JELLYFIN.to_string(),
        services::SONARR.to_string(),
        services::RADARR.to_string(),
    ];
    assert_eq!(dashboard.preferences.get().await.favorites, expected);
    let saved = mock.last_saved_preferences().await.expect("preferences pushed");
    assert_eq!(saved.favorites, expected);
}

#[tokio::test]
async fn test_cards_get_handlers_after_failed_first_poll() {
    let mock = MockApiServer::start().await;
    mock.mock_preferences_failure().await;
    mock.mock_services_failure_times(503, 1).await;
    mock.mock_services(&sample_services()).await;

    let mut dashboard = Dashboard::build(
        Arc::new(live_config(&mock.base_url)),
        Arc::new(FixedAnswer(false)),
    )
    .await
    .unwrap();
    dashboard.start().await;
    assert!(!dashboard.gestures.is_attached("media").await);

    let mut attached = false;
    for _ in 0..50 {
        sleep(Duration::from_millis(100)).await;
        if dashboard.gestures.is_attached("media").await {
            attached = true;
            break;
        }
    }
    assert!(attached, "handler attached once a poll succeeds");
    // Cards created from the API list get one too
    assert!(dashboard.gestures.is_attached(services::SONARR).await);
    assert!(!dashboard.gestures.is_attached(services::WATCHTOWER).await);

    dashboard.shutdown();
}
