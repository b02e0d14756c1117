//! This module provides reusable test utilities:
//! - Mock service-management API (wiremock)
//! - In-process recording backend for paused-clock tests
//! - Config file builders
//! - Common test data

// Each test binary uses a different subset of the fixtures
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_api;
pub mod recording_backend;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use mock_api::MockApiServer;
pub use recording_backend::RecordingBackend;
pub use test_config::{TestConfig, TestConfigBuilder};
pub use test_data::*;
