//! System stats polling with a simulated fallback

use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::DemoConfig;
use crate::demo::MetricSimulator;
use crate::http::HttpServiceApi;
use crate::model::{StatsSample, StatsSource};
use crate::notify::Notifier;

pub struct SystemMonitor {
    remote: Option<Arc<HttpServiceApi>>,
    simulator: Mutex<MetricSimulator>,
    latest: RwLock<Option<StatsSample>>,
    consecutive_failures: AtomicU32,
    interval_seconds: u64,
    notifier: Notifier,
}

impl SystemMonitor {
    /// `remote` is `None` in demo mode; every sample is then simulated
    pub fn new(
        remote: Option<Arc<HttpServiceApi>>,
        demo: DemoConfig,
        interval_seconds: u64,
        notifier: Notifier,
    ) -> Self {
        Self {
            remote,
            simulator: Mutex::new(MetricSimulator::new(demo)),
            latest: RwLock::new(None),
            consecutive_failures: AtomicU32::new(0),
            interval_seconds,
            notifier,
        }
    }

    pub async fn latest(&self) -> Option<StatsSample> {
        self.latest.read().await.clone()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    async fn simulate(&self) -> StatsSample {
        let stats = self.simulator.lock().await.tick(self.interval_seconds);
        StatsSample {
            stats,
            source: StatsSource::Simulated,
            taken_at: Utc::now(),
        }
    }

    /// Poll once; failures fall back to the simulator for this tick
    pub async fn refresh(&self) -> StatsSample {
        let sample = match &self.remote {
            Some(api) => match api.system_stats().await {
                Ok(stats) => {
                    let failures = self.consecutive_failures.swap(0, Ordering::SeqCst);
                    if failures > 0 {
                        info!("System stats endpoint recovered after {} failures", failures);
                        self.notifier.info("Live system stats restored");
                    }
                    StatsSample {
                        stats,
                        source: StatsSource::Live,
                        taken_at: Utc::now(),
                    }
                }
                Err(e) => {
                    let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                    if failures == 1 {
                        warn!("System stats unavailable, switching to simulated data: {}", e);
                        self.notifier
                            .warning("Server stats unavailable - showing simulated values");
                    } else {
                        debug!("System stats still unavailable ({} failures): {}", failures, e);
                    }
                    self.simulate().await
                }
            },
            None => self.simulate().await,
        };

        *self.latest.write().await = Some(sample.clone());
        sample
    }
}
