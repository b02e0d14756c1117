use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{DemoConfig, MetricRange};
use crate::model::SystemStats;

/// Bounded random walk over host metrics for demo/offline display
pub struct MetricSimulator {
    config: DemoConfig,
    rng: StdRng,
    current: SystemStats,
}

impl MetricSimulator {
    pub fn new(config: DemoConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let current = SystemStats {
            cpu: config.cpu.midpoint(),
            memory: config.memory.midpoint(),
            disk: config.disk.midpoint(),
            wifi: false,
            ethernet: true,
            hostname: config.hostname.clone(),
            uptime: 3 * 24 * 3600,
        };
        Self {
            config,
            rng,
            current,
        }
    }

    fn walk(rng: &mut StdRng, value: f64, range: &MetricRange) -> f64 {
        let delta = if range.step > 0.0 {
            rng.random_range(-range.step..=range.step)
        } else {
            0.0
        };
        range.clamp(value + delta)
    }

    /// Advance the simulation by `elapsed_seconds` and return the new sample
    pub fn tick(&mut self, elapsed_seconds: u64) -> SystemStats {
        self.current.cpu = Self::walk(&mut self.rng, self.current.cpu, &self.config.cpu);
        self.current.memory = Self::walk(&mut self.rng, self.current.memory, &self.config.memory);
        self.current.disk = Self::walk(&mut self.rng, self.current.disk, &self.config.disk);
        self.current.uptime += elapsed_seconds;
        self.current.clone()
    }

    pub fn current(&self) -> &SystemStats {
        &self.current
    }
}
