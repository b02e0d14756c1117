use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::backend::ServiceBackend;
use crate::constants::demo::{ACTION_DELAY_MS, FETCH_DELAY_MS};
use crate::errors::ApiError;
use crate::model::{ActionResponse, Service, ServiceDetails, ServiceStatus};

/// Local stand-in for the service-management API
pub struct DemoBackend {
    services: Mutex<Vec<Service>>,
    // service -> services that stop working without it
    dependents: HashMap<String, Vec<String>>,
    fetch_delay: Duration,
    action_delay: Duration,
    rng: StdMutex<StdRng>,
}

impl DemoBackend {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_catalog(demo_catalog(), demo_dependents(), seed)
    }

    pub fn with_catalog(
        services: Vec<Service>,
        dependents: HashMap<String, Vec<String>>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            services: Mutex::new(services),
            dependents,
            fetch_delay: Duration::from_millis(FETCH_DELAY_MS),
            action_delay: Duration::from_millis(ACTION_DELAY_MS),
            rng: StdMutex::new(rng),
        }
    }

    /// Override the artificial latency
    pub fn with_delays(mut self, fetch_delay: Duration, action_delay: Duration) -> Self {
        self.fetch_delay = fetch_delay;
        self.action_delay = action_delay;
        self
    }

    fn not_found(name: &str) -> ApiError {
        ApiError::ActionFailed {
            service: name.to_string(),
            message: format!("no such container: {}", name),
        }
    }

    fn random_between(&self, low: f64, high: f64) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        if high <= low {
            return low;
        }
        rng.random_range(low..high)
    }
}

#[async_trait]
impl ServiceBackend for DemoBackend {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        sleep(self.fetch_delay).await;
        Ok(self.services.lock().await.clone())
    }

    async fn enable_service(&self, name: &str) -> Result<ActionResponse, ApiError> {
        sleep(self.action_delay).await;
        let mut services = self.services.lock().await;
        let service = services
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| Self::not_found(name))?;

        service.enabled = true;
        service.status = ServiceStatus::Running;
        info!("[demo] enabled {}", name);

        Ok(ActionResponse {
            success: true,
            message: Some(format!("{} enabled", service.title())),
            ..Default::default()
        })
    }

    async fn disable_service(&self, name: &str, force: bool) -> Result<ActionResponse, ApiError> {
        sleep(self.action_delay).await;
        let mut services = self.services.lock().await;
        if !services.iter().any(|s| s.name == name) {
            return Err(Self::not_found(name));
        }

        let affected: Vec<String> = self
            .dependents
            .get(name)
            .map(|deps| {
                deps.iter()
                    .filter(|dep| services.iter().any(|s| &s.name == *dep && s.enabled))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if !affected.is_empty() && !force {
            debug!("[demo] disabling {} needs force, affects {:?}", name, affected);
            return Ok(ActionResponse {
                success: false,
                message: Some(format!(
                    "{} other service(s) depend on {}",
                    affected.len(),
                    name
                )),
                requires_force: true,
                affected_services: affected,
                ..Default::default()
            });
        }

        let mut ram_freed = 0.0;
        for service in services
            .iter_mut()
            .filter(|s| s.name == name || affected.contains(&s.name))
        {
            if service.enabled {
                ram_freed += service.ram_estimate_mb;
            }
            service.enabled = false;
            service.status = ServiceStatus::Exited;
        }
        info!("[demo] disabled {} (+{} dependents)", name, affected.len());

        Ok(ActionResponse {
            success: true,
            message: Some(format!("{} disabled", name)),
            ram_freed_mb: Some(ram_freed),
            requires_force: false,
            affected_services: affected,
        })
    }

    async fn service_details(&self, name: &str) -> Result<ServiceDetails, ApiError> {
        let service = {
            let services = self.services.lock().await;
            services.iter().find(|s| s.name == name).cloned()
        }
        .ok_or_else(|| Self::not_found(name))?;

        if !service.status.is_running() {
            return Ok(ServiceDetails::default());
        }

        Ok(ServiceDetails {
            cpu_percent: self.random_between(0.5, 25.0),
            ram_current_mb: self.random_between(
                service.ram_estimate_mb * 0.5,
                service.ram_estimate_mb,
            ),
        })
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

fn demo_service(
    name: &str,
    display_name: &str,
    category: &str,
    description: &str,
    ram_estimate_mb: f64,
    enabled: bool,
) -> Service {
    Service {
        name: name.to_string(),
        display_name: display_name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        enabled,
        status: if enabled {
            ServiceStatus::Running
        } else {
            ServiceStatus::Exited
        },
        ram_estimate_mb,
    }
}

pub fn demo_catalog() -> Vec<Service> {
    vec![
        demo_service("jellyfin", "Jellyfin", "media", "Stream your movies and shows", 512.0, true),
        demo_service("sonarr", "Sonarr", "media", "TV show automation", 256.0, true),
        demo_service("radarr", "Radarr", "media", "Movie automation", 256.0, false),
        demo_service("nextcloud", "Nextcloud", "productivity", "Files and calendars", 384.0, true),
        demo_service("immich", "Immich", "photos", "Photo and video backup", 768.0, true),
        demo_service("postgres", "PostgreSQL", "infrastructure", "Shared database", 192.0, true),
        demo_service("home-assistant", "Home Assistant", "home", "Home automation hub", 320.0, true),
        demo_service("vaultwarden", "Vaultwarden", "security", "Password manager", 64.0, false),
        demo_service("dashboard", "Dashboard", "system", "This dashboard", 48.0, true),
        demo_service("watchtower", "Watchtower", "system", "Automatic container updates", 32.0, true),
    ]
}

fn demo_dependents() -> HashMap<String, Vec<String>> {
    HashMap::from([(
        "postgres".to_string(),
        vec!["nextcloud".to_string(), "immich".to_string()],
    )])
}
