use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::ServiceBackend;
use crate::constants::http::{
    ACTION_TIMEOUT, DETAIL_TIMEOUT, FETCH_TIMEOUT, PREFERENCES_TIMEOUT, STATS_TIMEOUT,
};
use crate::errors::ApiError;
use crate::model::{ActionRequest, ActionResponse, Service, ServiceDetails, ServiceList, SystemStats};
use crate::stores::Preferences;

/// Client for the service-management REST API
#[derive(Clone)]
pub struct HttpServiceApi {
    base_url: String,
    client: Client,
    fetch_timeout: Duration,
}

impl HttpServiceApi {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            fetch_timeout: FETCH_TIMEOUT,
        })
    }

    /// Override the service-list timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(endpoint, e))?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                code,
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let request = self.client.get(&url).timeout(timeout);
        self.send_json(&url, request).await
    }

    async fn post_action(
        &self,
        name: &str,
        action: &str,
        force: bool,
    ) -> Result<ActionResponse, ApiError> {
        let url = self.url(&format!("/services/{}/{}", name, action));
        info!("POST {} (force={})", url, force);

        let response = self
            .client
            .post(&url)
            .timeout(ACTION_TIMEOUT)
            .json(&ActionRequest { force })
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let parsed = serde_json::from_str::<ActionResponse>(&body);
        if status.is_success() {
            return parsed.map_err(|e| ApiError::InvalidResponse {
                endpoint: url,
                reason: e.to_string(),
            });
        }

        // Conflict responses still carry a structured body (requires_force)
        match parsed {
            Ok(parsed) if parsed.requires_force => Ok(parsed),
            Ok(parsed) => Err(ApiError::ActionFailed {
                service: name.to_string(),
                message: parsed
                    .message
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            }),
            Err(_) => Err(ApiError::Status {
                endpoint: url,
                code: status.as_u16(),
                body,
            }),
        }
    }

    pub async fn system_stats(&self) -> Result<SystemStats, ApiError> {
        self.get_json("/system/stats", STATS_TIMEOUT).await
    }

    pub async fn get_preferences(&self) -> Result<Preferences, ApiError> {
        self.get_json("/preferences", PREFERENCES_TIMEOUT).await
    }

    pub async fn put_preferences(&self, preferences: &Preferences) -> Result<(), ApiError> {
        let url = self.url("/preferences");
        let response = self
            .client
            .put(&url)
            .timeout(PREFERENCES_TIMEOUT)
            .json(preferences)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, e))?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            warn!("Saving preferences returned HTTP {}", code);
            return Err(ApiError::Status {
                endpoint: url,
                code,
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceBackend for HttpServiceApi {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        let list: ServiceList = self.get_json("/services", self.fetch_timeout).await?;
        Ok(list.services)
    }

    async fn enable_service(&self, name: &str) -> Result<ActionResponse, ApiError> {
        self.post_action(name, "enable", false).await
    }

    async fn disable_service(&self, name: &str, force: bool) -> Result<ActionResponse, ApiError> {
        self.post_action(name, "disable", force).await
    }

    async fn service_details(&self, name: &str) -> Result<ServiceDetails, ApiError> {
        self.get_json(&format!("/services/{}", name), DETAIL_TIMEOUT)
            .await
    }
}
