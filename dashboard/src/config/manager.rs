use super::Config;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

/// Environment variable that forces demo mode on or off
pub const DEMO_MODE_ENV: &str = "DASHBOARD_DEMO_MODE";

#[derive(Debug)]
pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_path: String) -> Result<Self> {
        let mut config = Self::load_configuration(&config_path).await?;
        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    /// Wrap an already-built configuration (tests, embedded use)
    pub fn from_config(mut config: Config) -> Result<Self> {
        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_path: &str) -> Result<Config> {
        let content = fs::read_to_string(config_path).await.map_err(|e| {
            anyhow!(ConfigError::LoadFailed {
                path: config_path.to_string(),
                reason: e.to_string(),
            })
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            anyhow!(ConfigError::LoadFailed {
                path: config_path.to_string(),
                reason: e.to_string(),
            })
        })?;

        info!(
            "Loaded dashboard config from {}: {} cards, demo_mode={}",
            config_path,
            config.cards.len(),
            config.demo_mode
        );

        Ok(config)
    }

    fn apply_env_overrides(config: &mut Config) {
        let Ok(raw) = std::env::var(DEMO_MODE_ENV) else {
            return;
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => config.demo_mode = true,
            "0" | "false" | "no" | "off" => config.demo_mode = false,
            other => {
                warn!("Ignoring unrecognised {} value '{}'", DEMO_MODE_ENV, other);
                return;
            }
        }
        debug!("{} override applied: demo_mode={}", DEMO_MODE_ENV, config.demo_mode);
    }

    fn validate(config: &Config) -> Result<()> {
        if config.poll_interval_seconds == 0 {
            return Err(anyhow!(ConfigError::InvalidValue {
                field: "poll_interval_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            }));
        }
        if config.stats_interval_seconds == 0 {
            return Err(anyhow!(ConfigError::InvalidValue {
                field: "stats_interval_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            }));
        }
        for (field, range) in [
            ("demo.cpu", &config.demo.cpu),
            ("demo.memory", &config.demo.memory),
            ("demo.disk", &config.demo.disk),
        ] {
            if range.min > range.max || range.min < 0.0 || range.max > 100.0 || range.step < 0.0 {
                return Err(anyhow!(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!(
                        "range {}..{} (step {}) must lie within 0..100 with a non-negative step",
                        range.min, range.max, range.step
                    ),
                }));
            }
        }
        if !config.demo_mode && !config.api_base_url.starts_with("http") {
            return Err(anyhow!(ConfigError::InvalidValue {
                field: "api_base_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", config.api_base_url),
            }));
        }
        Ok(())
    }
}
