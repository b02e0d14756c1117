//! Custom error types for the dashboard client
//!
//! Provides structured error handling with context for the failure classes the
//! dashboard has to degrade gracefully from.

use std::fmt;

/// Main error type for the dashboard
#[derive(Debug)]
pub enum DashboardError {
    /// Configuration-related errors
    Config(ConfigError),

    /// Communication errors with the service-management API
    Api(ApiError),

    /// Client storage errors
    Storage(StorageError),

    /// Favorites list rule violations
    Favorites(FavoritesError),

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },
}

/// API communication error variants
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Connection to the API failed
    ConnectionFailed { endpoint: String, reason: String },

    /// Request exceeded its time budget
    Timeout { endpoint: String },

    /// API answered with a non-success status code
    Status { endpoint: String, code: u16, body: String },

    /// Response body could not be decoded
    InvalidResponse { endpoint: String, reason: String },

    /// API reported the action as failed
    ActionFailed { service: String, message: String },

    /// The fetch was overtaken by a newer one before it completed
    Superseded { sequence: u64 },
}

/// Client storage error variants
#[derive(Debug)]
pub enum StorageError {
    /// Writing would exceed the storage quota
    QuotaExceeded { key: String, needed: usize, quota: usize },

    /// Value could not be serialized or deserialized
    Serialization { key: String, reason: String },

    /// Underlying file I/O failed
    Io { reason: String },
}

/// Favorites error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesError {
    /// The list already holds the maximum number of entries
    Full { max: usize },

    /// Reorder index outside the list
    InvalidIndex { index: usize, len: usize },
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Config(e) => write!(f, "Configuration error: {}", e),
            DashboardError::Api(e) => write!(f, "API error: {}", e),
            DashboardError::Storage(e) => write!(f, "Storage error: {}", e),
            DashboardError::Favorites(e) => write!(f, "Favorites error: {}", e),
            DashboardError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ConnectionFailed { endpoint, reason } => {
                write!(f, "Connection to {} failed: {}", endpoint, reason)
            }
            ApiError::Timeout { endpoint } => write!(f, "Request to {} timed out", endpoint),
            ApiError::Status {
                endpoint,
                code,
                body,
            } => write!(f, "{} returned HTTP {}: {}", endpoint, code, body),
            ApiError::InvalidResponse { endpoint, reason } => {
                write!(f, "Invalid response from {}: {}", endpoint, reason)
            }
            ApiError::ActionFailed { service, message } => {
                write!(f, "Action on '{}' failed: {}", service, message)
            }
            ApiError::Superseded { sequence } => {
                write!(f, "Fetch #{} superseded by a newer fetch", sequence)
            }
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QuotaExceeded { key, needed, quota } => write!(
                f,
                "Storing '{}' needs {} bytes, quota is {} bytes",
                key, needed, quota
            ),
            StorageError::Serialization { key, reason } => {
                write!(f, "Failed to (de)serialize '{}': {}", key, reason)
            }
            StorageError::Io { reason } => write!(f, "Storage I/O failed: {}", reason),
        }
    }
}

impl fmt::Display for FavoritesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FavoritesError::Full { max } => {
                write!(f, "Favorites are full ({} max), remove one first", max)
            }
            FavoritesError::InvalidIndex { index, len } => {
                write!(f, "Index {} is out of range for {} favorites", index, len)
            }
        }
    }
}

impl std::error::Error for DashboardError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ApiError {}
impl std::error::Error for StorageError {}
impl std::error::Error for FavoritesError {}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::Other(err.to_string())
    }
}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        DashboardError::Config(err)
    }
}

impl From<ApiError> for DashboardError {
    fn from(err: ApiError) -> Self {
        DashboardError::Api(err)
    }
}

impl From<StorageError> for DashboardError {
    fn from(err: StorageError) -> Self {
        DashboardError::Storage(err)
    }
}

impl From<FavoritesError> for DashboardError {
    fn from(err: FavoritesError) -> Self {
        DashboardError::Favorites(err)
    }
}

impl ApiError {
    /// Build an error from a reqwest failure, keeping timeouts distinct
    pub fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if err.is_decode() {
            ApiError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }
        } else {
            ApiError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }
        }
    }
}
