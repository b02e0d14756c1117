//! Common test data and constants

use dashboard::{Service, ServiceStatus};

/// Common test service names
pub mod services {
    pub const JELLYFIN: &str = "jellyfin";
    pub const SONARR: &str = "sonarr";
    pub const RADARR: &str = "radarr";
    pub const POSTGRES: &str = "postgres";
    pub const NEXTCLOUD: &str = "nextcloud";
    /// Protected by name
    pub const WATCHTOWER: &str = "watchtower";
    /// Protected by prefix
    pub const SYSTEM_LOGGER: &str = "system-logger";
}

pub fn service(name: &str, enabled: bool) -> Service {
    Service {
        name: name.to_string(),
        display_name: String::new(),
        description: String::new(),
        category: "media".to_string(),
        enabled,
        status: if enabled {
            ServiceStatus::Running
        } else {
            ServiceStatus::Exited
        },
        ram_estimate_mb: 256.0,
    }
}

/// A small mixed catalog: two running, one disabled, one system
pub fn sample_services() -> Vec<Service> {
    vec![
        service(services::JELLYFIN, true),
        service(services::SONARR, true),
        service(services::RADARR, false),
        service(services::WATCHTOWER, true),
    ]
}
