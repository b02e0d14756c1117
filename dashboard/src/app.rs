//! Composition root: builds every component once and runs the background loops

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::ServiceBackend;
use crate::config::Config;
use crate::constants::intervals::HEALTH_RECORD_SECONDS;
use crate::demo::DemoBackend;
use crate::errors::DashboardError;
use crate::http::HttpServiceApi;
use crate::interaction::{ConfirmPrompt, GestureHandler, Tour};
use crate::monitor::SystemMonitor;
use crate::notify::Notifier;
use crate::offline_cache::OfflineCache;
use crate::storage::{ClientStorage, FileStore, MemoryStore};
use crate::stores::{FavoritesStore, HealthHistoryStore, PreferencesStore};
use crate::sync::ServiceSynchronizer;
use crate::view::{ServiceGrid, ServiceManagerModal};

pub struct Dashboard {
    pub config: Arc<Config>,
    pub notifier: Notifier,
    pub sync: Arc<ServiceSynchronizer>,
    pub gestures: Arc<GestureHandler>,
    pub monitor: Arc<SystemMonitor>,
    pub favorites: Arc<FavoritesStore>,
    pub health: Arc<HealthHistoryStore>,
    pub preferences: Arc<PreferencesStore>,
    tasks: Vec<JoinHandle<()>>,
}

impl Dashboard {
    /// Wire up every component; nothing is polled until [`start`](Self::start)
    pub async fn build(config: Arc<Config>, prompt: Arc<dyn ConfirmPrompt>) -> Result<Self> {
        let storage = match &config.storage_path {
            Some(path) => {
                info!("Client state stored in {}", path);
                ClientStorage::new(Arc::new(FileStore::open(path).await))
            }
            None => {
                info!("No storage_path configured, client state kept in memory");
                ClientStorage::new(Arc::new(MemoryStore::new()))
            }
        };

        let notifier = Notifier::new();
        let (backend, remote): (Arc<dyn ServiceBackend>, Option<Arc<HttpServiceApi>>) =
            if config.demo_mode {
                info!("Demo mode enabled, no requests will reach the server");
                let demo: Arc<dyn ServiceBackend> = Arc::new(DemoBackend::new(config.demo.seed));
                (demo, None)
            } else {
                let api = Arc::new(HttpServiceApi::new(&config.api_base_url)?);
                info!("Using service API at {}", api.base_url());
                let backend: Arc<dyn ServiceBackend> = api.clone();
                (backend, Some(api))
            };

        let preferences = Arc::new(PreferencesStore::load(storage.clone(), remote.clone()).await);
        let favorites = Arc::new(FavoritesStore::new(storage.clone()).await);
        // Synced favorites lead; local-only entries are kept after them
        let synced = preferences.get().await.favorites;
        let merged = favorites.merge(synced.clone()).await;
        if merged != synced {
            preferences.set_favorites(merged).await;
        }
        let health = Arc::new(HealthHistoryStore::new(storage.clone()).await);
        let monitor = Arc::new(SystemMonitor::new(
            remote,
            config.demo.clone(),
            config.stats_interval_seconds,
            notifier.clone(),
        ));

        let grid = Arc::new(Mutex::new(ServiceGrid::from_config(&config.cards)));
        let sync = Arc::new(
            ServiceSynchronizer::new(backend, grid, notifier.clone(), prompt)
                .with_cache(OfflineCache::new(storage)),
        );
        let gestures = Arc::new(
            GestureHandler::new(sync.clone())
                .with_hold_duration(Duration::from_millis(config.long_press_ms)),
        );

        Ok(Self {
            config,
            notifier,
            sync,
            gestures,
            monitor,
            favorites,
            health,
            preferences,
            tasks: Vec::new(),
        })
    }

    /// First poll, gesture attachment, then the recurring loops
    pub async fn start(&mut self) {
        self.tasks.push(self.gestures.follow_renders());
        if let Err(e) = self.sync.initialize().await {
            warn!("Initial service poll failed, continuing with cached state: {}", e);
        }
        self.gestures.attach_all().await;
        self.record_health().await;

        self.tasks.push(
            self.sync
                .start_polling(Duration::from_secs(self.config.poll_interval_seconds)),
        );
        self.tasks.push(self.spawn_stats_loop());
        self.tasks.push(self.spawn_health_loop());

        info!(
            "Dashboard started: services every {}s, stats every {}s",
            self.config.poll_interval_seconds, self.config.stats_interval_seconds
        );
    }

    fn spawn_stats_loop(&self) -> JoinHandle<()> {
        let monitor = self.monitor.clone();
        let period = Duration::from_secs(self.config.stats_interval_seconds);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                monitor.refresh().await;
            }
        })
    }

    fn spawn_health_loop(&self) -> JoinHandle<()> {
        let sync = self.sync.clone();
        let health = self.health.clone();
        let period = Duration::from_secs(HEALTH_RECORD_SECONDS as u64);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let catalog = sync.catalog().await;
                let ids = sync.id_map().await;
                health
                    .record_snapshot(catalog.services(), &ids, Utc::now())
                    .await;
            }
        })
    }

    async fn record_health(&self) {
        let catalog = self.sync.catalog().await;
        let ids = self.sync.id_map().await;
        self.health
            .record_snapshot(catalog.services(), &ids, Utc::now())
            .await;
    }

    /// Toggle a favorite and mirror the list into the preferences
    pub async fn toggle_favorite(&self, service_id: &str) -> Result<bool, DashboardError> {
        let added = self.favorites.toggle(service_id).await?;
        self.preferences
            .set_favorites(self.favorites.list().await)
            .await;
        Ok(added)
    }

    pub fn service_manager(&self) -> ServiceManagerModal {
        ServiceManagerModal::new(self.sync.clone())
    }

    pub fn tour(&self) -> Tour {
        Tour::new(self.preferences.clone())
    }

    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        info!("Dashboard background tasks stopped");
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
