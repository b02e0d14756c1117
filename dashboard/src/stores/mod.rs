//! Client-side feature stores
//!
//! Each store loads from [`ClientStorage`](crate::storage::ClientStorage) with
//! a fallback to empty, mutates in memory, and persists after every mutation.

pub mod favorites;
pub mod health_history;
pub mod preferences;

pub use favorites::FavoritesStore;
pub use health_history::{HealthHistoryStore, HealthSample, HealthState};
pub use preferences::{Preferences, PreferencesSource, PreferencesStore, Theme};
