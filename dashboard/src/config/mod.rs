pub mod manager;
use serde::{Deserialize, Serialize};
pub use manager::ConfigManager;

use crate::constants::{gesture, intervals};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub demo_mode: bool,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_stats_interval")]
    pub stats_interval_seconds: u64,
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    // None keeps client state in memory only
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub cards: Vec<CardConfig>,
    #[serde(default)]
    pub demo: DemoConfig,
}

/// A tile declared on the dashboard grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub service_id: String,
    /// Container backing the tile; defaults to `service_id`
    pub container: Option<String>,
    pub href: Option<String>,
}

impl CardConfig {
    pub fn container_name(&self) -> &str {
        self.container.as_deref().unwrap_or(&self.service_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_cpu_range")]
    pub cpu: MetricRange,
    #[serde(default = "default_memory_range")]
    pub memory: MetricRange,
    #[serde(default = "default_disk_range")]
    pub disk: MetricRange,
    /// Fixed seed for reproducible simulations
    pub seed: Option<u64>,
}

/// Bounds and per-tick step of a simulated metric, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl MetricRange {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            demo_mode: false,
            poll_interval_seconds: default_poll_interval(),
            stats_interval_seconds: default_stats_interval(),
            long_press_ms: default_long_press_ms(),
            storage_path: None,
            cards: Vec::new(),
            demo: DemoConfig::default(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            cpu: default_cpu_range(),
            memory: default_memory_range(),
            disk: default_disk_range(),
            seed: None,
        }
    }
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_poll_interval() -> u64 {
    intervals::SERVICE_POLL_SECONDS
}

fn default_stats_interval() -> u64 {
    intervals::STATS_POLL_SECONDS
}

fn default_long_press_ms() -> u64 {
    gesture::LONG_PRESS_DURATION.as_millis() as u64
}

fn default_hostname() -> String {
    "homeserver".to_string()
}

fn default_cpu_range() -> MetricRange {
    MetricRange {
        min: 5.0,
        max: 65.0,
        step: 8.0,
    }
}

fn default_memory_range() -> MetricRange {
    MetricRange {
        min: 30.0,
        max: 80.0,
        step: 3.0,
    }
}

fn default_disk_range() -> MetricRange {
    MetricRange {
        min: 40.0,
        max: 60.0,
        step: 0.5,
    }
}
