pub mod app;
pub mod backend;
pub mod config;
pub mod constants;
pub mod demo;
pub mod error_translator;
pub mod errors;
pub mod http;
pub mod interaction;
pub mod model;
pub mod monitor;
pub mod notify;
pub mod offline_cache;
pub mod storage;
pub mod stores;
pub mod sync;
pub mod view;

// Re-export commonly used types
pub use app::Dashboard;
pub use backend::ServiceBackend;
pub use config::{CardConfig, Config, ConfigManager, DemoConfig, MetricRange};
pub use demo::DemoBackend;
pub use errors::{ApiError, DashboardError};
pub use http::HttpServiceApi;
pub use model::{ActionResponse, Service, ServiceDetails, ServiceStatus, SystemStats};
pub use notify::{Notifier, Toast, ToastLevel};
pub use sync::{ActionOutcome, ServiceCatalog, ServiceSynchronizer};
