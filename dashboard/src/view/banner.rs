use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sync::ServiceCatalog;

/// Where the data on screen currently comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataMode {
    /// Latest poll succeeded
    Live,
    /// Demo simulator
    Demo,
    /// Last poll failed; showing the previous good state
    Stale,
    /// Seeded from the offline cache, no poll has succeeded yet
    Cached,
    /// Nothing loaded yet
    Loading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBanner {
    pub mode: DataMode,
    pub total: usize,
    pub running: usize,
    pub stopped: usize,
    pub disabled: usize,
    /// RAM the disabled services would use if enabled
    pub disabled_ram_mb: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl StatusBanner {
    pub fn loading() -> Self {
        Self {
            mode: DataMode::Loading,
            total: 0,
            running: 0,
            stopped: 0,
            disabled: 0,
            disabled_ram_mb: 0.0,
            last_updated: None,
        }
    }

    pub fn compose(catalog: &ServiceCatalog, mode: DataMode) -> Self {
        let mut banner = Self {
            mode,
            total: catalog.len(),
            last_updated: catalog.fetched_at(),
            ..Self::loading()
        };

        for service in catalog.services() {
            if !service.enabled {
                banner.disabled_ram_mb += service.ram_estimate_mb;
            } else if service.status.is_running() {
                banner.running += 1;
            } else {
                banner.stopped += 1;
            }
        }
        banner.disabled = catalog.disabled().len();
        banner
    }

    pub fn headline(&self) -> String {
        match self.mode {
            DataMode::Loading => "Loading services...".to_string(),
            DataMode::Demo => format!(
                "Demo mode - {} running, {} disabled",
                self.running, self.disabled
            ),
            DataMode::Stale => format!(
                "Connection lost - showing last known state ({} services)",
                self.total
            ),
            DataMode::Cached => format!("Offline - showing cached state ({} services)", self.total),
            DataMode::Live if self.stopped > 0 => format!(
                "{} running, {} need attention, {} disabled",
                self.running, self.stopped, self.disabled
            ),
            DataMode::Live => format!("All {} services running, {} disabled", self.running, self.disabled),
        }
    }
}
