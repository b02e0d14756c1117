//! The seam between the synchronizer and whatever owns the real service state

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::model::{ActionResponse, Service, ServiceDetails};

/// Source of truth for services: the live API or the demo simulator
#[async_trait]
pub trait ServiceBackend: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError>;

    async fn enable_service(&self, name: &str) -> Result<ActionResponse, ApiError>;

    async fn disable_service(&self, name: &str, force: bool) -> Result<ActionResponse, ApiError>;

    async fn service_details(&self, name: &str) -> Result<ServiceDetails, ApiError>;

    /// Whether results are simulated locally
    fn is_simulated(&self) -> bool {
        false
    }
}
