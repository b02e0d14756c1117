//! Test configuration builder for writing dashboard configs to disk

use dashboard::CardConfig;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for dashboard.toml files
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    api_base_url: Option<String>,
    demo_mode: Option<bool>,
    poll_interval_seconds: Option<u64>,
    storage: bool,
    cards: Vec<CardConfig>,
    extra: String,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            api_base_url: None,
            demo_mode: None,
            poll_interval_seconds: None,
            storage: false,
            cards: Vec::new(),
            extra: String::new(),
        }
    }

    pub fn api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = Some(url.to_string());
        self
    }

    pub fn demo_mode(mut self, enabled: bool) -> Self {
        self.demo_mode = Some(enabled);
        self
    }

    pub fn poll_interval(mut self, seconds: u64) -> Self {
        self.poll_interval_seconds = Some(seconds);
        self
    }

    /// Persist client state in a file inside the temp dir
    pub fn with_storage(mut self) -> Self {
        self.storage = true;
        self
    }

    pub fn card(mut self, service_id: &str, container: Option<&str>) -> Self {
        self.cards.push(CardConfig {
            service_id: service_id.to_string(),
            container: container.map(str::to_string),
            href: None,
        });
        self
    }

    /// Raw TOML appended verbatim
    pub fn raw(mut self, toml: &str) -> Self {
        self.extra.push_str(toml);
        self.extra.push('\n');
        self
    }

    pub fn to_toml(&self) -> String {
        let mut toml = String::new();
        if let Some(url) = &self.api_base_url {
            toml.push_str(&format!("api_base_url = \"{}\"\n", url));
        }
        if let Some(demo) = self.demo_mode {
            toml.push_str(&format!("demo_mode = {}\n", demo));
        }
        if let Some(seconds) = self.poll_interval_seconds {
            toml.push_str(&format!("poll_interval_seconds = {}\n", seconds));
        }
        if self.storage {
            let path = self.temp_dir.path().join("state.json");
            toml.push_str(&format!("storage_path = {:?}\n", path.display().to_string()));
        }
        toml.push_str(&self.extra);
        for card in &self.cards {
            toml.push_str("\n[[cards]]\n");
            toml.push_str(&format!("service_id = \"{}\"\n", card.service_id));
            if let Some(container) = &card.container {
                toml.push_str(&format!("container = \"{}\"\n", container));
            }
        }
        toml
    }

    pub fn build(self) -> TestConfig {
        let path = self.temp_dir.path().join("dashboard.toml");
        fs::write(&path, self.to_toml()).expect("Failed to write dashboard.toml");
        TestConfig {
            _temp_dir: self.temp_dir,
            path,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Config file on disk; removed when dropped
pub struct TestConfig {
    _temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestConfig {
    pub fn path_string(&self) -> String {
        self.path.display().to_string()
    }
}
