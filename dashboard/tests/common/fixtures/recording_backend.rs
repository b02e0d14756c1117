//! In-process backend that records every call
//!
//! Used where the tokio clock is paused: wiremock requests would race the
//! auto-advancing clock, this backend never leaves the runtime.

use async_trait::async_trait;
use dashboard::{ActionResponse, ApiError, Service, ServiceBackend, ServiceDetails, ServiceStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

pub struct RecordingBackend {
    services: Mutex<Vec<Service>>,
    // scripted responses for list_services, consumed in order
    list_script: Mutex<VecDeque<(Duration, Result<Vec<Service>, ApiError>)>>,
    requires_force: Mutex<HashMap<String, Vec<String>>>,
    action_delay: Duration,
    pub list_calls: AtomicUsize,
    pub enable_calls: AtomicUsize,
    pub disable_calls: AtomicUsize,
    pub forced_disable_calls: AtomicUsize,
}

impl RecordingBackend {
    pub fn new(services: Vec<Service>) -> Self {
        Self {
            services: Mutex::new(services),
            list_script: Mutex::new(VecDeque::new()),
            requires_force: Mutex::new(HashMap::new()),
            action_delay: Duration::from_millis(50),
            list_calls: AtomicUsize::new(0),
            enable_calls: AtomicUsize::new(0),
            disable_calls: AtomicUsize::new(0),
            forced_disable_calls: AtomicUsize::new(0),
        }
    }

    /// Queue a list response returned after `delay`
    pub fn script_list(&self, delay: Duration, response: Result<Vec<Service>, ApiError>) {
        self.list_script
            .lock()
            .unwrap()
            .push_back((delay, response));
    }

    /// Unforced disables of `name` answer requires_force listing `affected`
    pub fn require_force(&self, name: &str, affected: &[&str]) {
        self.requires_force.lock().unwrap().insert(
            name.to_string(),
            affected.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn set_services(&self, services: Vec<Service>) {
        *self.services.lock().unwrap() = services;
    }

    pub fn actions(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst) + self.disable_calls.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), ApiError> {
        let mut services = self.services.lock().unwrap();
        let service = services
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| ApiError::ActionFailed {
                service: name.to_string(),
                message: "no such container".to_string(),
            })?;
        service.enabled = enabled;
        service.status = if enabled {
            ServiceStatus::Running
        } else {
            ServiceStatus::Exited
        };
        Ok(())
    }
}

#[async_trait]
impl ServiceBackend for RecordingBackend {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.list_script.lock().unwrap().pop_front();
        match scripted {
            Some((delay, response)) => {
                sleep(delay).await;
                response
            }
            None => Ok(self.services.lock().unwrap().clone()),
        }
    }

    async fn enable_service(&self, name: &str) -> Result<ActionResponse, ApiError> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.action_delay).await;
        self.set_enabled(name, true)?;
        Ok(ActionResponse {
            success: true,
            ..Default::default()
        })
    }

    async fn disable_service(&self, name: &str, force: bool) -> Result<ActionResponse, ApiError> {
        self.disable_calls.fetch_add(1, Ordering::SeqCst);
        if force {
            self.forced_disable_calls.fetch_add(1, Ordering::SeqCst);
        }
        sleep(self.action_delay).await;

        let affected = self.requires_force.lock().unwrap().get(name).cloned();
        if let (Some(affected), false) = (affected, force) {
            return Ok(ActionResponse {
                success: false,
                requires_force: true,
                affected_services: affected,
                ..Default::default()
            });
        }

        self.set_enabled(name, false)?;
        Ok(ActionResponse {
            success: true,
            ram_freed_mb: Some(128.0),
            ..Default::default()
        })
    }

    async fn service_details(&self, _name: &str) -> Result<ServiceDetails, ApiError> {
        Ok(ServiceDetails {
            cpu_percent: 1.5,
            ram_current_mb: 64.0,
        })
    }
}
