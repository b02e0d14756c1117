use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use dashboard::interaction::FixedAnswer;
use dashboard::{Config, ConfigManager, Dashboard, ToastLevel};

const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";
const CONFIG_PATH_ENV: &str = "DASHBOARD_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("dashboard=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting home-server dashboard");

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config_manager = if Path::new(&config_path).exists() {
        ConfigManager::new(config_path).await?
    } else {
        warn!("No config at {}, using defaults", config_path);
        ConfigManager::from_config(Config::default())?
    };
    let config = config_manager.get_current_config();
    info!(
        "Configuration loaded: {} cards, demo_mode={}, api={}",
        config.cards.len(),
        config.demo_mode,
        config.api_base_url
    );

    // Headless: forced disables are always declined
    let mut dashboard = Dashboard::build(config, Arc::new(FixedAnswer(false))).await?;
    let mut banner = dashboard.sync.subscribe_banner();
    let mut toasts = dashboard.notifier.subscribe();

    dashboard.start().await;

    let modal = dashboard.service_manager();
    println!("{}", dashboard.sync.banner().headline());
    println!("{}", modal.render().await);

    loop {
        tokio::select! {
            changed = banner.changed() => {
                if changed.is_err() {
                    break;
                }
                let headline = banner.borrow_and_update().headline();
                println!("{}", headline);
            }
            toast = toasts.recv() => match toast {
                Ok(toast) => match toast.level {
                    ToastLevel::Error => error!("{} {}", toast.message, toast.detail.unwrap_or_default()),
                    ToastLevel::Warning => warn!("{}", toast.message),
                    _ => info!("{}", toast.message),
                },
                Err(RecvError::Lagged(skipped)) => warn!("Dropped {} notifications", skipped),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    println!("{}", modal.render().await);
    dashboard.shutdown();
    Ok(())
}
