use std::collections::HashSet;
use tokio::sync::{watch, RwLock};
use tracing::{info, instrument, warn};

use crate::constants::limits::MAX_FAVORITES;
use crate::constants::storage::FAVORITES_KEY;
use crate::errors::FavoritesError;
use crate::storage::ClientStorage;

/// Ordered, unique, capped list of favorite service ids
pub struct FavoritesStore {
    storage: ClientStorage,
    items: RwLock<Vec<String>>,
    changes: watch::Sender<Vec<String>>,
}

impl FavoritesStore {
    pub async fn new(storage: ClientStorage) -> Self {
        let stored: Vec<String> = storage.load(FAVORITES_KEY).await.unwrap_or_default();
        let items = normalize(stored);
        let (changes, _) = watch::channel(items.clone());
        Self {
            storage,
            items: RwLock::new(items),
            changes,
        }
    }

    async fn commit(&self, items: &[String]) {
        self.storage.save(FAVORITES_KEY, items).await;
        self.changes.send_replace(items.to_vec());
    }

    /// Fold in a list synced from elsewhere: its entries come first, local
    /// extras follow, capped at [`MAX_FAVORITES`]. Returns the resulting list.
    #[instrument(skip(self, synced))]
    pub async fn merge(&self, synced: Vec<String>) -> Vec<String> {
        let mut items = self.items.write().await;
        let merged = normalize(synced.into_iter().chain(items.iter().cloned()).collect());
        if merged != *items {
            info!(
                "Merged synced favorites: {} local, {} after merge",
                items.len(),
                merged.len()
            );
            *items = merged;
            self.commit(&items).await;
        }
        items.clone()
    }

    /// Receiver that observes the list after every mutation
    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.changes.subscribe()
    }

    pub async fn list(&self) -> Vec<String> {
        self.items.read().await.clone()
    }

    pub async fn contains(&self, service_id: &str) -> bool {
        self.items.read().await.iter().any(|id| id == service_id)
    }

    /// Append a favorite. `Ok(false)` when it is already present; a full list
    /// is rejected and left unchanged.
    #[instrument(skip(self))]
    pub async fn add(&self, service_id: &str) -> Result<bool, FavoritesError> {
        let mut items = self.items.write().await;
        if items.iter().any(|id| id == service_id) {
            return Ok(false);
        }
        if items.len() >= MAX_FAVORITES {
            warn!("Rejected favorite {}: list is full", service_id);
            return Err(FavoritesError::Full { max: MAX_FAVORITES });
        }

        items.push(service_id.to_string());
        self.commit(&items).await;
        info!("Added {} to favorites ({} total)", service_id, items.len());
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, service_id: &str) -> bool {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|id| id != service_id);
        if items.len() == before {
            return false;
        }
        self.commit(&items).await;
        true
    }

    /// Flip membership; returns whether the service is a favorite afterwards
    pub async fn toggle(&self, service_id: &str) -> Result<bool, FavoritesError> {
        if self.remove(service_id).await {
            Ok(false)
        } else {
            self.add(service_id).await.map(|_| true)
        }
    }

    /// Drag-reorder: move the entry at `from` so it ends up at `to`
    pub async fn reorder(&self, from: usize, to: usize) -> Result<(), FavoritesError> {
        let mut items = self.items.write().await;
        let len = items.len();
        for index in [from, to] {
            if index >= len {
                return Err(FavoritesError::InvalidIndex { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let moved = items.remove(from);
        items.insert(to, moved);
        self.commit(&items).await;
        Ok(())
    }

    pub async fn clear(&self) {
        let mut items = self.items.write().await;
        items.clear();
        self.commit(&items).await;
    }
}

/// Drop duplicates keeping first occurrence, then enforce the cap
fn normalize(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut items: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
    if items.len() > MAX_FAVORITES {
        warn!(
            "Favorites hold {} entries, keeping the first {}",
            items.len(),
            MAX_FAVORITES
        );
        items.truncate(MAX_FAVORITES);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> FavoritesStore {
        FavoritesStore::new(ClientStorage::in_memory()).await
    }

    #[tokio::test]
    async fn test_thirteenth_add_is_rejected() {
        let favorites = store().await;
        for i in 0..MAX_FAVORITES {
            assert_eq!(favorites.add(&format!("svc-{}", i)).await, Ok(true));
        }
        let before = favorites.list().await;

        let result = favorites.add("svc-overflow").await;
        assert_eq!(result, Err(FavoritesError::Full { max: 12 }));
        assert_eq!(favorites.list().await, before);
    }

    #[tokio::test]
    async fn test_duplicates_are_ignored() {
        let favorites = store().await;
        assert_eq!(favorites.add("plex").await, Ok(true));
        assert_eq!(favorites.add("plex").await, Ok(false));
        assert_eq!(favorites.list().await, vec!["plex".to_string()]);
    }

    #[tokio::test]
    async fn test_reorder_moves_entry() {
        let favorites = store().await;
        for id in ["a", "b", "c", "d"] {
            favorites.add(id).await.unwrap();
        }

        favorites.reorder(0, 2).await.unwrap();
        assert_eq!(favorites.list().await, vec!["b", "c", "a", "d"]);

        assert_eq!(
            favorites.reorder(1, 9).await,
            Err(FavoritesError::InvalidIndex { index: 9, len: 4 })
        );
    }

    #[tokio::test]
    async fn test_persisted_across_instances() {
        let storage = ClientStorage::in_memory();
        let first = FavoritesStore::new(storage.clone()).await;
        first.add("nextcloud").await.unwrap();
        first.add("plex").await.unwrap();

        let second = FavoritesStore::new(storage).await;
        assert_eq!(second.list().await, vec!["nextcloud", "plex"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_mutation() {
        let favorites = store().await;
        let mut rx = favorites.subscribe();

        favorites.toggle("plex").await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), vec!["plex".to_string()]);

        favorites.toggle("plex").await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_merge_puts_synced_entries_first() {
        let favorites = store().await;
        favorites.add("plex").await.unwrap();
        favorites.add("sonarr").await.unwrap();

        let merged = favorites
            .merge(vec!["jellyfin".to_string(), "plex".to_string()])
            .await;
        assert_eq!(merged, vec!["jellyfin", "plex", "sonarr"]);
        assert_eq!(favorites.list().await, merged);
    }

    #[tokio::test]
    async fn test_merge_respects_cap() {
        let favorites = store().await;
        favorites.add("local").await.unwrap();

        let synced: Vec<String> = (0..MAX_FAVORITES).map(|i| format!("svc-{}", i)).collect();
        let merged = favorites.merge(synced.clone()).await;
        assert_eq!(merged, synced);
        assert!(!favorites.contains("local").await);
    }
}
