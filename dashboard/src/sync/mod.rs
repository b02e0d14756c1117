//! Canonical service state and the poller that keeps it current

pub mod catalog;
pub mod synchronizer;

pub use catalog::{IdMap, ReconcileReport, ServiceCatalog};
pub use synchronizer::{ActionOutcome, ServiceSynchronizer, SERVICES_ENDPOINT};
