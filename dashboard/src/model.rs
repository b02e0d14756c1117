//! Service and system types exchanged with the service-management API
//!
//! Every field the API may omit carries a serde default so unexpected shapes
//! degrade to zero/empty values instead of failing the whole response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::system_services::{PROTECTED_NAMES, PROTECTED_PREFIXES};

/// Container state as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Running,
    Stopped,
    Exited,
    Restarting,
    Paused,
    #[serde(other)]
    Unknown,
}

impl Default for ServiceStatus {
    fn default() -> Self {
        ServiceStatus::Unknown
    }
}

impl ServiceStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ServiceStatus::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Exited => "exited",
            ServiceStatus::Restarting => "restarting",
            ServiceStatus::Paused => "paused",
            ServiceStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Container name; the canonical key
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default)]
    pub ram_estimate_mb: f64,
}

impl Service {
    /// Display name, falling back to the container name
    pub fn title(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    pub fn is_system(&self) -> bool {
        is_system_service(&self.name)
    }
}

/// Whether a container is infrastructure the user may not toggle.
///
/// Pure: decided from the name alone.
pub fn is_system_service(name: &str) -> bool {
    PROTECTED_NAMES.contains(&name) || PROTECTED_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// `GET /services` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceList {
    #[serde(default)]
    pub services: Vec<Service>,
}

/// Body sent with enable/disable requests
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionRequest {
    pub force: bool,
}

/// Enable/disable response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub ram_freed_mb: Option<f64>,
    #[serde(default)]
    pub requires_force: bool,
    #[serde(default)]
    pub affected_services: Vec<String>,
}

/// Live per-service metrics from the detail endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDetails {
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub ram_current_mb: f64,
}

/// Host summary from the system stats endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory: f64,
    #[serde(default)]
    pub disk: f64,
    #[serde(default)]
    pub wifi: bool,
    #[serde(default)]
    pub ethernet: bool,
    #[serde(default)]
    pub hostname: String,
    /// Uptime in seconds
    #[serde(default)]
    pub uptime: u64,
}

/// Where a [`SystemStats`] sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatsSource {
    Live,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSample {
    pub stats: SystemStats,
    pub source: StatsSource,
    pub taken_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_service_classification() {
        assert!(is_system_service("dashboard"));
        assert!(is_system_service("watchtower"));
        assert!(is_system_service("system-updater"));
        assert!(is_system_service("core-dns"));
        assert!(!is_system_service("jellyfin"));
        assert!(!is_system_service("my-system-thing"));
    }

    #[test]
    fn test_missing_fields_default() {
        let service: Service = serde_json::from_str(r#"{"name": "plex"}"#).unwrap();
        assert_eq!(service.name, "plex");
        assert!(!service.enabled);
        assert_eq!(service.status, ServiceStatus::Unknown);
        assert_eq!(service.ram_estimate_mb, 0.0);
        assert_eq!(service.title(), "plex");
    }

    #[test]
    fn test_unrecognised_status_maps_to_unknown() {
        let service: Service =
            serde_json::from_str(r#"{"name": "plex", "status": "dead", "enabled": true}"#).unwrap();
        assert_eq!(service.status, ServiceStatus::Unknown);
    }

    #[test]
    fn test_action_response_defaults() {
        let response: ActionResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.success);
        assert!(!response.requires_force);
        assert!(response.affected_services.is_empty());
    }
}
