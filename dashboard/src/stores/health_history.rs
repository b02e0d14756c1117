use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use crate::constants::intervals::HEALTH_RECORD_SECONDS;
use crate::constants::limits::MAX_HEALTH_SAMPLES;
use crate::constants::storage::HEALTH_HISTORY_KEY;
use crate::model::{Service, ServiceStatus};
use crate::storage::ClientStorage;
use crate::sync::IdMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Online,
    Offline,
    Degraded,
    Unknown,
}

impl HealthState {
    /// Health of an enabled service; disabled services are not tracked
    pub fn of(service: &Service) -> Option<Self> {
        if !service.enabled {
            return None;
        }
        Some(match service.status {
            ServiceStatus::Running => HealthState::Online,
            ServiceStatus::Restarting | ServiceStatus::Paused => HealthState::Degraded,
            ServiceStatus::Stopped | ServiceStatus::Exited => HealthState::Offline,
            ServiceStatus::Unknown => HealthState::Unknown,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSample {
    pub timestamp: DateTime<Utc>,
    pub status: HealthState,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedHistory {
    #[serde(default)]
    last_recorded: Option<DateTime<Utc>>,
    #[serde(default)]
    services: BTreeMap<String, Vec<HealthSample>>,
}

/// Per-service uptime samples, capped at [`MAX_HEALTH_SAMPLES`] each.
///
/// Samples are keyed by service id, the same id cards and favorites use.
/// Containers without a card fall back to their container name.
pub struct HealthHistoryStore {
    storage: ClientStorage,
    state: RwLock<PersistedHistory>,
    version: watch::Sender<u64>,
}

impl HealthHistoryStore {
    pub async fn new(storage: ClientStorage) -> Self {
        let mut state: PersistedHistory = storage
            .load(HEALTH_HISTORY_KEY)
            .await
            .unwrap_or_default();
        for samples in state.services.values_mut() {
            truncate_oldest(samples);
        }
        let (version, _) = watch::channel(0);
        Self {
            storage,
            state: RwLock::new(state),
            version,
        }
    }

    async fn commit(&self, state: &PersistedHistory) {
        self.storage.save(HEALTH_HISTORY_KEY, state).await;
        self.version.send_modify(|v| *v += 1);
    }

    /// Bumped after every mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Append one sample, evicting the oldest beyond the cap
    pub async fn append(&self, service_id: &str, status: HealthState, timestamp: DateTime<Utc>) {
        let mut state = self.state.write().await;
        let samples = state.services.entry(service_id.to_string()).or_default();
        samples.push(HealthSample { timestamp, status });
        truncate_oldest(samples);
        self.commit(&state).await;
    }

    /// Record one sample per service if the recording cadence has elapsed.
    /// Returns whether anything was recorded.
    pub async fn record_snapshot<'a, I>(
        &self,
        services: I,
        ids: &IdMap,
        now: DateTime<Utc>,
    ) -> bool
    where
        I: IntoIterator<Item = &'a Service>,
    {
        let mut state = self.state.write().await;
        if let Some(last) = state.last_recorded {
            if now - last < Duration::seconds(HEALTH_RECORD_SECONDS) {
                debug!("Skipping health snapshot, last one at {}", last);
                return false;
            }
        }

        let mut recorded = 0usize;
        for service in services {
            let Some(status) = HealthState::of(service) else {
                continue;
            };
            let service_id = ids
                .service_id_for(&service.name)
                .unwrap_or(service.name.as_str());
            let samples = state.services.entry(service_id.to_string()).or_default();
            samples.push(HealthSample {
                timestamp: now,
                status,
            });
            truncate_oldest(samples);
            recorded += 1;
        }

        state.last_recorded = Some(now);
        self.commit(&state).await;
        info!("Recorded health snapshot for {} services", recorded);
        true
    }

    pub async fn samples(&self, service_id: &str) -> Vec<HealthSample> {
        self.state
            .read()
            .await
            .services
            .get(service_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Share of known samples that were online, 0..=100
    pub async fn uptime_percent(&self, service_id: &str) -> Option<f64> {
        let state = self.state.read().await;
        let samples = state.services.get(service_id)?;
        let known: Vec<_> = samples
            .iter()
            .filter(|s| s.status != HealthState::Unknown)
            .collect();
        if known.is_empty() {
            return None;
        }
        let online = known.iter().filter(|s| s.status == HealthState::Online).count();
        Some(online as f64 * 100.0 / known.len() as f64)
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = PersistedHistory::default();
        self.commit(&state).await;
    }
}

fn truncate_oldest(samples: &mut Vec<HealthSample>) {
    if samples.len() > MAX_HEALTH_SAMPLES {
        let excess = samples.len() - MAX_HEALTH_SAMPLES;
        samples.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::grid::ServiceCard;

    fn service(name: &str, enabled: bool, status: ServiceStatus) -> Service {
        Service {
            name: name.to_string(),
            display_name: String::new(),
            description: String::new(),
            category: String::new(),
            enabled,
            status,
            ram_estimate_mb: 0.0,
        }
    }

    #[tokio::test]
    async fn test_twenty_fifth_append_evicts_oldest() {
        let store = HealthHistoryStore::new(ClientStorage::in_memory()).await;
        let start = Utc::now();

        for i in 0..25 {
            store
                .append("plex", HealthState::Online, start + Duration::minutes(5 * i))
                .await;
        }

        let samples = store.samples("plex").await;
        assert_eq!(samples.len(), MAX_HEALTH_SAMPLES);
        assert_eq!(samples[0].timestamp, start + Duration::minutes(5));
        assert_eq!(
            samples.last().unwrap().timestamp,
            start + Duration::minutes(5 * 24)
        );
    }

    #[tokio::test]
    async fn test_snapshot_respects_cadence() {
        let store = HealthHistoryStore::new(ClientStorage::in_memory()).await;
        let services = vec![
            service("plex", true, ServiceStatus::Running),
            service("sonarr", true, ServiceStatus::Exited),
            service("radarr", false, ServiceStatus::Stopped),
        ];
        let ids = IdMap::default();
        let now = Utc::now();

        assert!(store.record_snapshot(&services, &ids, now).await);
        assert!(!store.record_snapshot(&services, &ids, now + Duration::minutes(2)).await);
        assert!(store.record_snapshot(&services, &ids, now + Duration::minutes(5)).await);

        assert_eq!(store.samples("plex").await.len(), 2);
        assert_eq!(store.samples("sonarr").await[0].status, HealthState::Offline);
        assert!(store.samples("radarr").await.is_empty());
    }

    #[tokio::test]
    async fn test_uptime_percent_ignores_unknown() {
        let store = HealthHistoryStore::new(ClientStorage::in_memory()).await;
        let now = Utc::now();
        store.append("plex", HealthState::Online, now).await;
        store.append("plex", HealthState::Offline, now).await;
        store.append("plex", HealthState::Unknown, now).await;
        store.append("plex", HealthState::Online, now).await;

        let uptime = store.uptime_percent("plex").await.unwrap();
        assert!((uptime - 66.666).abs() < 0.01);
        assert_eq!(store.uptime_percent("missing").await, None);
    }

    #[tokio::test]
    async fn test_snapshot_keys_samples_by_card_id() {
        let store = HealthHistoryStore::new(ClientStorage::in_memory()).await;
        let cards = [ServiceCard::new("media", Some("jellyfin"), None)];
        let ids = IdMap::from_cards(&cards);
        let services = vec![
            service("jellyfin", true, ServiceStatus::Running),
            service("sonarr", true, ServiceStatus::Running),
        ];

        assert!(store.record_snapshot(&services, &ids, Utc::now()).await);
        assert_eq!(store.samples("media").await.len(), 1);
        assert!(store.samples("jellyfin").await.is_empty());
        // No card binds sonarr
        assert_eq!(store.samples("sonarr").await.len(), 1);
    }
}
