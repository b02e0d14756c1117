//! Versioned offline cache of the last good API responses
//!
//! Entries live in client storage under `<version>:<endpoint>`. Installing a
//! cache generation drops every entry written by another generation, so a
//! format change only needs a version bump.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::storage::{CACHE_PREFIX, CACHE_VERSION};
use crate::storage::ClientStorage;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedResponse {
    stored_at: DateTime<Utc>,
    body: serde_json::Value,
}

#[derive(Clone)]
pub struct OfflineCache {
    storage: ClientStorage,
    version: String,
}

impl OfflineCache {
    pub fn new(storage: ClientStorage) -> Self {
        Self::with_version(storage, CACHE_VERSION)
    }

    pub fn with_version(storage: ClientStorage, version: &str) -> Self {
        Self {
            storage,
            version: version.to_string(),
        }
    }

    fn key(&self, endpoint: &str) -> String {
        format!("{}:{}", self.version, endpoint)
    }

    /// Activate this generation, purging entries of any other. Returns the
    /// number of purged entries.
    pub async fn install(&self) -> usize {
        let own_prefix = format!("{}:", self.version);
        let stale: Vec<String> = self
            .storage
            .keys_with_prefix(CACHE_PREFIX)
            .await
            .into_iter()
            .filter(|key| !key.starts_with(&own_prefix))
            .collect();

        for key in &stale {
            self.storage.remove(key).await;
        }
        if !stale.is_empty() {
            info!("Purged {} entries from old cache generations", stale.len());
        }
        stale.len()
    }

    pub async fn put<T: Serialize>(&self, endpoint: &str, body: &T) -> bool {
        let body = match serde_json::to_value(body) {
            Ok(body) => body,
            Err(e) => {
                debug!("Not caching {}: {}", endpoint, e);
                return false;
            }
        };
        self.storage.save(
            &self.key(endpoint),
            &CachedResponse {
                stored_at: Utc::now(),
                body,
            },
        )
        .await
    }

    /// Cached body and the time it was stored
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Option<(T, DateTime<Utc>)> {
        let cached: CachedResponse = self.storage.load(&self.key(endpoint)).await?;
        match serde_json::from_value(cached.body) {
            Ok(body) => Some((body, cached.stored_at)),
            Err(e) => {
                debug!("Cached {} no longer decodes: {}", endpoint, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_purges_other_generations() {
        let storage = ClientStorage::in_memory();
        let old = OfflineCache::with_version(storage.clone(), "dashboard-cache-v0");
        old.put("/services", &vec!["plex"]).await;
        storage.save("favorites", &vec!["plex"]).await;

        let current = OfflineCache::new(storage.clone());
        current.put("/services", &vec!["jellyfin"]).await;

        assert_eq!(current.install().await, 1);
        assert!(old.get::<Vec<String>>("/services").await.is_none());
        let (body, _) = current.get::<Vec<String>>("/services").await.unwrap();
        assert_eq!(body, vec!["jellyfin"]);
        assert!(storage.load::<Vec<String>>("favorites").await.is_some());
    }
}
