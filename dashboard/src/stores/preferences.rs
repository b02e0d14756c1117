use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::constants::storage::PREFERENCES_KEY;
use crate::http::HttpServiceApi;
use crate::storage::ClientStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub tour_completed: bool,
    #[serde(default)]
    pub admin_panel_expanded: bool,
}

/// Where the preferences in memory were loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferencesSource {
    Remote,
    Local,
    Default,
}

/// User settings, synced to the API with a local-storage fallback
pub struct PreferencesStore {
    storage: ClientStorage,
    remote: Option<Arc<HttpServiceApi>>,
    current: RwLock<Preferences>,
    source: PreferencesSource,
}

impl PreferencesStore {
    /// Load from the remote endpoint, falling back to local storage, then defaults
    pub async fn load(storage: ClientStorage, remote: Option<Arc<HttpServiceApi>>) -> Self {
        let (current, source) = match &remote {
            Some(api) => match api.get_preferences().await {
                Ok(preferences) => {
                    storage.save(PREFERENCES_KEY, &preferences).await;
                    (preferences, PreferencesSource::Remote)
                }
                Err(e) => {
                    warn!("Remote preferences unavailable, using local copy: {}", e);
                    Self::load_local(&storage).await
                }
            },
            None => Self::load_local(&storage).await,
        };

        info!("Preferences loaded from {:?}", source);
        Self {
            storage,
            remote,
            current: RwLock::new(current),
            source,
        }
    }

    async fn load_local(storage: &ClientStorage) -> (Preferences, PreferencesSource) {
        match storage.load::<Preferences>(PREFERENCES_KEY).await {
            Some(preferences) => (preferences, PreferencesSource::Local),
            None => (Preferences::default(), PreferencesSource::Default),
        }
    }

    pub fn source(&self) -> PreferencesSource {
        self.source
    }

    pub async fn get(&self) -> Preferences {
        self.current.read().await.clone()
    }

    async fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut Preferences),
    {
        let snapshot = {
            let mut current = self.current.write().await;
            mutate(&mut current);
            current.clone()
        };

        self.storage.save(PREFERENCES_KEY, &snapshot).await;
        if let Some(api) = &self.remote {
            if let Err(e) = api.put_preferences(&snapshot).await {
                warn!("Preferences saved locally only: {}", e);
            }
        }
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.update(|p| p.theme = theme).await;
    }

    pub async fn set_tour_completed(&self, completed: bool) {
        self.update(|p| p.tour_completed = completed).await;
    }

    pub async fn set_admin_panel_expanded(&self, expanded: bool) {
        self.update(|p| p.admin_panel_expanded = expanded).await;
    }

    pub async fn set_favorites(&self, favorites: Vec<String>) {
        self.update(|p| p.favorites = favorites).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_without_remote_or_local() {
        let store = PreferencesStore::load(ClientStorage::in_memory(), None).await;
        assert_eq!(store.source(), PreferencesSource::Default);
        assert_eq!(store.get().await, Preferences::default());
    }

    #[tokio::test]
    async fn test_setters_persist_locally() {
        let storage = ClientStorage::in_memory();
        let store = PreferencesStore::load(storage.clone(), None).await;
        store.set_theme(Theme::Dark).await;
        store.set_tour_completed(true).await;

        let reloaded = PreferencesStore::load(storage, None).await;
        assert_eq!(reloaded.source(), PreferencesSource::Local);
        let preferences = reloaded.get().await;
        assert_eq!(preferences.theme, Theme::Dark);
        assert!(preferences.tour_completed);
        assert!(!preferences.admin_panel_expanded);
    }
}
