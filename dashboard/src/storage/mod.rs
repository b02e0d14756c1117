//! Client-side key-value storage
//!
//! The dashboard keeps its client state (favorites, health history,
//! preferences, offline cache) in a flat string key-value store, the same shape
//! as browser localStorage. Two backends exist:
//!
//! - [`MemoryStore`] - process-local, with an optional byte quota
//! - [`FileStore`] - a single JSON document on disk, rewritten on every change
//!
//! Components never talk to a backend directly; they go through
//! [`ClientStorage`], which namespaces keys and turns every failure into a
//! logged warning plus an empty result. Backends are async; file writes go
//! through `tokio::fs`.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::constants::storage::KEY_PREFIX;
use crate::errors::StorageError;

/// A failed `set` or `remove` leaves the store as it was before the call
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Namespaced, failure-tolerant view over a [`KeyValueStore`]
#[derive(Clone)]
pub struct ClientStorage {
    backend: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl ClientStorage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            prefix: KEY_PREFIX.to_string(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Read and decode a value; missing, unreadable or corrupt entries yield `None`
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.full_key(key);
        let raw = match self.backend.get(&full_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", full_key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                let err = StorageError::Serialization {
                    key: full_key,
                    reason: e.to_string(),
                };
                warn!("Discarding corrupt entry: {}", err);
                None
            }
        }
    }

    /// Encode and write a value; returns whether it was persisted
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let full_key = self.full_key(key);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize {}: {}", full_key, e);
                return false;
            }
        };

        match self.backend.set(&full_key, raw).await {
            Ok(()) => {
                debug!("Persisted {}", full_key);
                true
            }
            Err(e) => {
                warn!("Failed to persist {}: {}", full_key, e);
                false
            }
        }
    }

    pub async fn remove(&self, key: &str) -> bool {
        let full_key = self.full_key(key);
        match self.backend.remove(&full_key).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to remove {}: {}", full_key, e);
                false
            }
        }
    }

    /// Unprefixed keys that start with `prefix`
    pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let keys = match self.backend.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list storage keys: {}", e);
                return Vec::new();
            }
        };

        keys.into_iter()
            .filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
            .filter(|k| k.starts_with(prefix))
            .collect()
    }
}
