//! Application-wide constants for timeouts, caps, and intervals
//!
//! This module organizes constants by category to provide a single source of
//! truth for polling cadence, gesture timing, and storage limits.

use std::time::Duration;

/// HTTP client timeout constants
pub mod http {
    use super::Duration;

    /// Timeout for the service-list request
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

    /// Timeout for enable/disable requests (containers can take a while to stop)
    pub const ACTION_TIMEOUT: Duration = Duration::from_secs(60);

    /// Timeout for best-effort detail requests
    pub const DETAIL_TIMEOUT: Duration = Duration::from_secs(5);

    /// Timeout for the system stats request
    pub const STATS_TIMEOUT: Duration = Duration::from_secs(5);

    /// Timeout for preference load/save
    pub const PREFERENCES_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Polling and recording cadence
pub mod intervals {
    /// Service list polling interval in production
    pub const SERVICE_POLL_SECONDS: u64 = 30;

    /// System stats polling interval
    pub const STATS_POLL_SECONDS: u64 = 5;

    /// Health history recording cadence
    pub const HEALTH_RECORD_SECONDS: i64 = 300;

    /// Number of consecutive polls a service may be missing before it leaves
    /// the managed set
    pub const MISSED_POLL_GRACE: u32 = 1;
}

/// Long-press gesture timing
pub mod gesture {
    use super::Duration;

    /// Hold duration that commits a long-press
    pub const LONG_PRESS_DURATION: Duration = Duration::from_millis(2500);

    /// Presses shorter than this are plain clicks and keep their navigation
    pub const CLICK_THRESHOLD: Duration = Duration::from_millis(200);

    /// Refresh rate of the visual countdown
    pub const PROGRESS_TICK: Duration = Duration::from_millis(100);
}

/// Demo-mode simulation constants
pub mod demo {
    /// Artificial latency applied to simulated list fetches
    pub const FETCH_DELAY_MS: u64 = 300;

    /// Artificial latency applied to simulated enable/disable actions
    pub const ACTION_DELAY_MS: u64 = 1500;
}

/// Limits and caps
pub mod limits {
    /// Maximum number of favorites
    pub const MAX_FAVORITES: usize = 12;

    /// Maximum health samples kept per service
    pub const MAX_HEALTH_SAMPLES: usize = 24;
}

/// Client storage keys
pub mod storage {
    /// Prefix applied to every persisted key
    pub const KEY_PREFIX: &str = "homeserver-dashboard:";

    pub const FAVORITES_KEY: &str = "favorites";

    pub const HEALTH_HISTORY_KEY: &str = "health-history";

    pub const PREFERENCES_KEY: &str = "preferences";

    /// Current offline cache generation; older generations are purged on install
    pub const CACHE_VERSION: &str = "dashboard-cache-v1";

    /// Prefix shared by every cache generation
    pub const CACHE_PREFIX: &str = "dashboard-cache-";
}

/// Services that can never be toggled from the dashboard
pub mod system_services {
    /// Explicitly protected container names
    pub const PROTECTED_NAMES: &[&str] = &[
        "dashboard",
        "service-manager",
        "reverse-proxy",
        "watchtower",
        "dns",
    ];

    /// Naming prefixes reserved for infrastructure containers
    pub const PROTECTED_PREFIXES: &[&str] = &["system-", "core-"];
}
