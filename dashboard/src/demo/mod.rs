//! Demo mode
//!
//! When no backend is reachable (or demo mode is switched on) the dashboard
//! runs against these local simulators. They add artificial latency and keep
//! every fluctuating value inside configured bounds.

pub mod backend;
pub mod metrics;

pub use backend::{demo_catalog, DemoBackend};
pub use metrics::MetricSimulator;
