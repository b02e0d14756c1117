//! Mock service-management API for testing
//!
//! Answers the dashboard's REST endpoints without a real home server.

use dashboard::stores::Preferences;
use dashboard::{Service, SystemStats};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path, path_regex},
    Mock, MockServer, ResponseTemplate,
};

/// Mock API server that simulates the service-management endpoints
pub struct MockApiServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockApiServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// `GET /services` returns the given list
    pub async fn mock_services(&self, services: &[Service]) {
        Mock::given(method("GET"))
            .and(path("/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "services": services
            })))
            .mount(&self.server)
            .await;
    }

    /// `GET /services` returns the given list for the next `times` requests
    pub async fn mock_services_times(&self, services: &[Service], times: u64) {
        Mock::given(method("GET"))
            .and(path("/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "services": services
            })))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// `GET /services` answers only after `delay`
    pub async fn mock_services_delayed(&self, services: &[Service], delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/services"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "services": services }))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// `GET /services` fails for the next `times` requests, then falls through
    /// to later mocks
    pub async fn mock_services_failure_times(&self, status: u16, times: u64) {
        Mock::given(method("GET"))
            .and(path("/services"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_services_failure(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/services"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_enable_success(&self, name: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/services/{}/enable", name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": format!("{} enabled", name)
            })))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_disable_success(&self, name: &str, ram_freed_mb: f64, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/services/{}/disable", name)))
            .and(body_partial_json(json!({ "force": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "ram_freed_mb": ram_freed_mb
            })))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Unforced disable answers 409 with the dependents; forced disable succeeds
    pub async fn mock_disable_requires_force(
        &self,
        name: &str,
        affected: &[&str],
        expected_forced_calls: u64,
    ) {
        Mock::given(method("POST"))
            .and(path(format!("/services/{}/disable", name)))
            .and(body_partial_json(json!({ "force": false })))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "success": false,
                "requires_force": true,
                "affected_services": affected
            })))
            .expect(1)
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("/services/{}/disable", name)))
            .and(body_partial_json(json!({ "force": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "ram_freed_mb": 512.0
            })))
            .expect(expected_forced_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_action_failure(&self, name: &str, action: &str, message: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/services/{}/{}", name, action)))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "success": false,
                "message": message
            })))
            .mount(&self.server)
            .await;
    }

    /// Fails verification if any enable/disable request arrives
    pub async fn expect_no_actions(&self) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/services/[^/]+/(enable|disable)$"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_stats(&self, stats: &SystemStats) {
        Mock::given(method("GET"))
            .and(path("/system/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stats))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_stats_failure(&self) {
        Mock::given(method("GET"))
            .and(path("/system/stats"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_preferences(&self, preferences: &Preferences) {
        Mock::given(method("GET"))
            .and(path("/preferences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(preferences))
            .mount(&self.server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/preferences"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_preferences_failure(&self) {
        Mock::given(path("/preferences"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&self.server)
            .await;
    }

    /// Body of the most recent `PUT /preferences`
    pub async fn last_saved_preferences(&self) -> Option<Preferences> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .rev()
            .find(|r| r.method.as_str() == "PUT" && r.url.path() == "/preferences")
            .and_then(|r| serde_json::from_slice(&r.body).ok())
    }

    /// Number of requests the server saw on `path`
    pub async fn request_count(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}
