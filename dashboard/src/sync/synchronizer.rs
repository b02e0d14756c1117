use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use super::catalog::{IdMap, ServiceCatalog};
use crate::backend::ServiceBackend;
use crate::constants::http::{DETAIL_TIMEOUT, FETCH_TIMEOUT};
use crate::error_translator::translate;
use crate::errors::ApiError;
use crate::interaction::prompt::ConfirmPrompt;
use crate::model::{is_system_service, ActionResponse, Service, ServiceDetails, ServiceList};
use crate::notify::Notifier;
use crate::offline_cache::OfflineCache;
use crate::view::banner::{DataMode, StatusBanner};
use crate::view::grid::ServiceGrid;

pub const SERVICES_ENDPOINT: &str = "/services";

/// Result of a user-initiated enable/disable
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Completed(ActionResponse),
    /// Refused locally: system services are never toggled
    SystemService,
    /// The user declined a forced disable
    Declined,
    Failed(ApiError),
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed(_))
    }
}

/// Owner of the canonical service state.
///
/// Nothing else mutates the catalog; other components read `Arc` snapshots
/// and go through [`enable_service`](Self::enable_service) /
/// [`disable_service`](Self::disable_service) to change it.
pub struct ServiceSynchronizer {
    backend: Arc<dyn ServiceBackend>,
    grid: Arc<Mutex<ServiceGrid>>,
    notifier: Notifier,
    prompt: Arc<dyn ConfirmPrompt>,
    cache: Option<OfflineCache>,
    fetch_timeout: Duration,
    catalog: RwLock<Arc<ServiceCatalog>>,
    id_map: RwLock<IdMap>,
    details: Arc<RwLock<HashMap<String, ServiceDetails>>>,
    next_sequence: AtomicU64,
    latest_issued: watch::Sender<u64>,
    rendered_sequence: AtomicU64,
    renders: watch::Sender<u64>,
    consecutive_failures: AtomicU32,
    seeded_from_cache: AtomicBool,
    banner: watch::Sender<StatusBanner>,
    details_task: Mutex<Option<JoinHandle<()>>>,
}

impl ServiceSynchronizer {
    pub fn new(
        backend: Arc<dyn ServiceBackend>,
        grid: Arc<Mutex<ServiceGrid>>,
        notifier: Notifier,
        prompt: Arc<dyn ConfirmPrompt>,
    ) -> Self {
        let (latest_issued, _) = watch::channel(0);
        let (banner, _) = watch::channel(StatusBanner::loading());
        let (renders, _) = watch::channel(0);
        Self {
            backend,
            grid,
            notifier,
            prompt,
            cache: None,
            fetch_timeout: FETCH_TIMEOUT,
            catalog: RwLock::new(Arc::new(ServiceCatalog::default())),
            id_map: RwLock::new(IdMap::default()),
            details: Arc::new(RwLock::new(HashMap::new())),
            next_sequence: AtomicU64::new(0),
            latest_issued,
            rendered_sequence: AtomicU64::new(0),
            renders,
            consecutive_failures: AtomicU32::new(0),
            seeded_from_cache: AtomicBool::new(false),
            banner,
            details_task: Mutex::new(None),
        }
    }

    pub fn with_cache(mut self, cache: OfflineCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    // === Read access ===

    /// Current canonical snapshot
    pub async fn catalog(&self) -> Arc<ServiceCatalog> {
        self.catalog.read().await.clone()
    }

    pub async fn service(&self, name: &str) -> Option<Service> {
        self.catalog.read().await.get(name).cloned()
    }

    pub async fn details(&self, name: &str) -> Option<ServiceDetails> {
        self.details.read().await.get(name).copied()
    }

    pub async fn container_for(&self, service_id: &str) -> Option<String> {
        self.id_map
            .read()
            .await
            .container_for(service_id)
            .map(str::to_string)
    }

    pub async fn id_map(&self) -> IdMap {
        self.id_map.read().await.clone()
    }

    pub fn grid(&self) -> Arc<Mutex<ServiceGrid>> {
        self.grid.clone()
    }

    pub fn subscribe_banner(&self) -> watch::Receiver<StatusBanner> {
        self.banner.subscribe()
    }

    /// Changes after every render that reached the grid
    pub fn subscribe_renders(&self) -> watch::Receiver<u64> {
        self.renders.subscribe()
    }

    pub fn banner(&self) -> StatusBanner {
        self.banner.borrow().clone()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    pub fn is_demo(&self) -> bool {
        self.backend.is_simulated()
    }

    // === Lifecycle ===

    /// Build the id maps, seed from the offline cache, then run the first poll
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<Arc<ServiceCatalog>, ApiError> {
        self.rebuild_id_map().await;

        if let Some(cache) = &self.cache {
            cache.install().await;
            if let Some((list, stored_at)) = cache.get::<ServiceList>(SERVICES_ENDPOINT).await {
                let seeded = {
                    let mut current = self.catalog.write().await;
                    if current.is_empty() {
                        let seeded =
                            Arc::new(ServiceCatalog::from_services(list.services, 0, stored_at));
                        *current = seeded.clone();
                        Some(seeded)
                    } else {
                        None
                    }
                };
                if let Some(seeded) = seeded {
                    self.seeded_from_cache.store(true, Ordering::SeqCst);
                    info!(
                        "Seeded {} services from offline cache (stored {})",
                        seeded.len(),
                        stored_at
                    );
                    self.render(&seeded).await;
                }
            }
        }

        if self.is_demo() {
            info!("Service synchronizer running against the demo simulator");
        }
        self.fetch_and_render().await
    }

    /// Poll every `period` until the returned task is aborted
    pub fn start_polling(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let sync = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately; initialize() already polled
            interval.tick().await;
            let mut polls = 0u64;

            loop {
                interval.tick().await;
                polls += 1;
                if polls % 10 == 0 {
                    info!(
                        "Service polling cycle #{} - consecutive failures: {}",
                        polls,
                        sync.consecutive_failures()
                    );
                }
                if let Err(e) = sync.fetch_and_render().await {
                    debug!("Poll #{} produced no update: {}", polls, e);
                }
            }
        })
    }

    async fn rebuild_id_map(&self) {
        let grid = self.grid.lock().await;
        let map = IdMap::from_cards(grid.cards());
        debug!("Built id map for {} cards", map.len());
        *self.id_map.write().await = map;
    }

    // === Fetching ===

    /// Poll the service list and wholesale-replace the canonical state.
    ///
    /// A failed poll leaves the previous state untouched. A poll overtaken by
    /// a newer one is abandoned and returns [`ApiError::Superseded`].
    #[instrument(skip(self))]
    pub async fn fetch_service_status(&self) -> Result<Arc<ServiceCatalog>, ApiError> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest_issued.send_modify(|latest| *latest = (*latest).max(sequence));
        let mut newer = self.latest_issued.subscribe();

        let result = tokio::select! {
            result = timeout(self.fetch_timeout, self.backend.list_services()) => result,
            _ = async { let _ = newer.wait_for(|latest| *latest > sequence).await; } => {
                debug!("Fetch #{} superseded while in flight", sequence);
                return Err(ApiError::Superseded { sequence });
            }
        };

        let services = match result {
            Ok(Ok(services)) => services,
            Ok(Err(e)) => return Err(self.record_failure(sequence, e).await),
            Err(_) => {
                let e = ApiError::Timeout {
                    endpoint: SERVICES_ENDPOINT.to_string(),
                };
                return Err(self.record_failure(sequence, e).await);
            }
        };

        let cached = ServiceList {
            services: services.clone(),
        };
        let catalog = {
            let mut current = self.catalog.write().await;
            if sequence <= current.sequence() {
                debug!(
                    "Discarding fetch #{}, #{} already applied",
                    sequence,
                    current.sequence()
                );
                return Err(ApiError::Superseded { sequence });
            }

            let (next, report) = current.reconcile(services, sequence, Utc::now());
            if !report.added.is_empty() || !report.removed.is_empty() {
                info!(
                    "Fetch #{}: {} services, added {:?}, removed {:?}",
                    sequence,
                    next.len(),
                    report.added,
                    report.removed
                );
            }
            if !report.missing.is_empty() {
                warn!(
                    "Fetch #{}: {:?} missing, keeping last known state",
                    sequence, report.missing
                );
            }
            let next = Arc::new(next);
            *current = next.clone();
            next
        };

        let failures = self.consecutive_failures.swap(0, Ordering::SeqCst);
        if failures > 0 {
            info!("Service list reachable again after {} failed polls", failures);
        }
        self.seeded_from_cache.store(false, Ordering::SeqCst);
        if let Some(cache) = &self.cache {
            cache.put(SERVICES_ENDPOINT, &cached).await;
        }

        Ok(catalog)
    }

    async fn record_failure(&self, sequence: u64, error: ApiError) -> ApiError {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        warn!(
            "Fetch #{} failed ({} in a row), keeping previous state: {}",
            sequence, failures, error
        );
        if failures == 1 {
            self.notifier
                .warning("Lost connection to the server - showing last known state");
        }
        let current = self.catalog().await;
        self.publish_banner(&current);
        error
    }

    /// Fetch, then render from that fetch's own snapshot
    pub async fn fetch_and_render(&self) -> Result<Arc<ServiceCatalog>, ApiError> {
        let catalog = self.fetch_service_status().await?;
        self.render(&catalog).await;
        self.spawn_detail_refresh(&catalog).await;
        Ok(catalog)
    }

    // === Rendering ===

    /// Re-render every card from the current canonical snapshot
    pub async fn update_all_cards(&self) -> usize {
        let catalog = self.catalog().await;
        self.render(&catalog).await
    }

    async fn render(&self, catalog: &ServiceCatalog) -> usize {
        let mut grid = self.grid.lock().await;

        // A newer snapshot may already be on screen
        let rendered_sequence = self.rendered_sequence.load(Ordering::SeqCst);
        if catalog.sequence() < rendered_sequence {
            debug!(
                "Skipping render of #{}, #{} already rendered",
                catalog.sequence(),
                rendered_sequence
            );
            return 0;
        }
        self.rendered_sequence
            .store(catalog.sequence(), Ordering::SeqCst);

        if grid.ensure_cards(catalog.services()) > 0 {
            *self.id_map.write().await = IdMap::from_cards(grid.cards());
        }

        let id_map = self.id_map.read().await;
        let mut rendered = 0;
        for card in grid.cards_mut() {
            let service = id_map
                .container_for(&card.service_id)
                .and_then(|container| catalog.get(container));
            let missing = service.is_some_and(|s| catalog.is_missing(&s.name));
            if card.render(service, missing) {
                rendered += 1;
            } else {
                debug!("Card {} is mid-press, not re-rendered", card.service_id);
            }
        }
        drop(id_map);
        drop(grid);

        self.publish_banner(catalog);
        self.renders.send_modify(|count| *count += 1);
        rendered
    }

    fn publish_banner(&self, catalog: &ServiceCatalog) {
        let mode = if self.is_demo() {
            DataMode::Demo
        } else if catalog.sequence() == 0 {
            if self.seeded_from_cache.load(Ordering::SeqCst) {
                DataMode::Cached
            } else {
                DataMode::Loading
            }
        } else if self.consecutive_failures() > 0 {
            DataMode::Stale
        } else {
            DataMode::Live
        };
        self.banner
            .send_replace(StatusBanner::compose(catalog, mode));
    }

    /// Best-effort live metrics for running services, off the render path
    async fn spawn_detail_refresh(&self, catalog: &ServiceCatalog) {
        let running: Vec<String> = catalog
            .services()
            .into_iter()
            .filter(|s| s.enabled && s.status.is_running())
            .map(|s| s.name.clone())
            .collect();
        if running.is_empty() {
            return;
        }

        let backend = self.backend.clone();
        let details = self.details.clone();
        let grid = self.grid.clone();
        let id_map = self.id_map.read().await.clone();
        let handle = tokio::spawn(async move {
            refresh_details(backend, running, details, grid, id_map).await;
        });

        if let Some(previous) = self.details_task.lock().await.replace(handle) {
            previous.abort();
        }
    }

    // === Actions ===

    async fn title_of(&self, name: &str) -> String {
        self.catalog
            .read()
            .await
            .get(name)
            .map(|s| s.title().to_string())
            .unwrap_or_else(|| name.to_string())
    }

    fn report_failure(&self, verb: &str, title: &str, error: &ApiError) {
        let friendly = translate(&error.to_string());
        warn!("Failed to {} {}: {}", verb, title, error);
        self.notifier.error(
            format!("Could not {} {}: {}", verb, title, friendly.message),
            Some(friendly.suggestion.to_string()),
        );
    }

    async fn resync(&self) {
        if let Err(e) = self.fetch_and_render().await {
            debug!("Re-sync after action produced no update: {}", e);
        }
    }

    #[instrument(skip(self))]
    pub async fn enable_service(&self, name: &str) -> ActionOutcome {
        if is_system_service(name) {
            warn!("Refusing to enable system service {}", name);
            return ActionOutcome::SystemService;
        }

        let title = self.title_of(name).await;
        self.notifier.info(format!("Enabling {}...", title));

        let outcome = match self.backend.enable_service(name).await {
            Ok(response) if response.success => {
                self.notifier.success(
                    response
                        .message
                        .clone()
                        .unwrap_or_else(|| format!("{} enabled", title)),
                );
                ActionOutcome::Completed(response)
            }
            Ok(response) => {
                let error = ApiError::ActionFailed {
                    service: name.to_string(),
                    message: response.message.unwrap_or_else(|| "unknown error".to_string()),
                };
                self.report_failure("enable", &title, &error);
                ActionOutcome::Failed(error)
            }
            Err(error) => {
                self.report_failure("enable", &title, &error);
                ActionOutcome::Failed(error)
            }
        };

        self.resync().await;
        outcome
    }

    #[instrument(skip(self))]
    pub async fn disable_service(&self, name: &str, force: bool) -> ActionOutcome {
        if is_system_service(name) {
            warn!("Refusing to disable system service {}", name);
            return ActionOutcome::SystemService;
        }

        let title = self.title_of(name).await;
        self.notifier.info(format!("Disabling {}...", title));

        let mut result = self.backend.disable_service(name, force).await;

        if let Ok(response) = &result {
            if response.requires_force && !force {
                let message = if response.affected_services.is_empty() {
                    format!("{} is needed by other services. Disable it anyway?", title)
                } else {
                    format!(
                        "Disabling {} will also stop: {}. Continue?",
                        title,
                        response.affected_services.join(", ")
                    )
                };

                if self.prompt.confirm(&message).await {
                    info!("Forced disable of {} confirmed", name);
                    result = self.backend.disable_service(name, true).await;
                } else {
                    info!("Forced disable of {} declined", name);
                    self.notifier.info(format!("{} left running", title));
                    self.resync().await;
                    return ActionOutcome::Declined;
                }
            }
        }

        let outcome = match result {
            Ok(response) if response.success => {
                let message = match response.ram_freed_mb {
                    Some(freed) if freed > 0.0 => format!("{} disabled, freed {:.0} MB", title, freed),
                    _ => format!("{} disabled", title),
                };
                self.notifier.success(message);
                ActionOutcome::Completed(response)
            }
            Ok(response) => {
                let error = ApiError::ActionFailed {
                    service: name.to_string(),
                    message: response.message.unwrap_or_else(|| "unknown error".to_string()),
                };
                self.report_failure("disable", &title, &error);
                ActionOutcome::Failed(error)
            }
            Err(error) => {
                self.report_failure("disable", &title, &error);
                ActionOutcome::Failed(error)
            }
        };

        self.resync().await;
        outcome
    }
}

async fn refresh_details(
    backend: Arc<dyn ServiceBackend>,
    names: Vec<String>,
    details: Arc<RwLock<HashMap<String, ServiceDetails>>>,
    grid: Arc<Mutex<ServiceGrid>>,
    id_map: IdMap,
) {
    let lookups = names.iter().map(|name| {
        let backend = backend.clone();
        async move {
            let result = timeout(DETAIL_TIMEOUT, backend.service_details(name)).await;
            (name.clone(), result)
        }
    });

    let mut fetched = HashMap::new();
    for (name, result) in join_all(lookups).await {
        match result {
            Ok(Ok(detail)) => {
                fetched.insert(name, detail);
            }
            Ok(Err(e)) => debug!("No details for {}: {}", name, e),
            Err(_) => debug!("Details for {} timed out", name),
        }
    }

    {
        let mut grid = grid.lock().await;
        for (name, detail) in &fetched {
            let Some(service_id) = id_map.service_id_for(name) else {
                continue;
            };
            if let Some(card) = grid.card_mut(service_id) {
                card.details = Some(*detail);
            }
        }
    }

    debug!("Refreshed details for {}/{} services", fetched.len(), names.len());
    details.write().await.extend(fetched);
}
