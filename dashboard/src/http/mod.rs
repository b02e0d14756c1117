//! HTTP communication with the service-management API
//!
//! # Endpoints
//!
//! ```text
//! GET  {base}/services                 -> { services: [...] }
//! POST {base}/services/{name}/enable   -> ActionResponse
//! POST {base}/services/{name}/disable  -> ActionResponse   (body { force })
//! GET  {base}/services/{name}          -> { cpu_percent, ram_current_mb }
//! GET  {base}/system/stats             -> SystemStats
//! GET  {base}/preferences              -> Preferences
//! PUT  {base}/preferences
//! ```
//!
//! Every request carries its own timeout; a timed-out request is reported as
//! [`ApiError::Timeout`](crate::errors::ApiError::Timeout) and treated like
//! any other failure by the caller.

pub mod api_client;

pub use api_client::HttpServiceApi;
