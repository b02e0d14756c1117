//! Toast notifications
//!
//! Components publish short user-facing messages here; whatever renders the
//! dashboard subscribes and shows them. Publishing never fails, even with no
//! subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Toast>,
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    pub fn notify(&self, level: ToastLevel, message: impl Into<String>, detail: Option<String>) {
        let toast = Toast {
            level,
            message: message.into(),
            detail,
            created_at: Utc::now(),
        };
        debug!("Toast [{:?}] {}", toast.level, toast.message);
        // No receivers is fine
        let _ = self.sender.send(toast);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(ToastLevel::Info, message, None);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(ToastLevel::Success, message, None);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(ToastLevel::Warning, message, None);
    }

    pub fn error(&self, message: impl Into<String>, detail: Option<String>) {
        self.notify(ToastLevel::Error, message, detail);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
