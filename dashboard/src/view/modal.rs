//! Service manager modal and disabled-services panel

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::ApiError;
use crate::model::Service;
use crate::sync::{ActionOutcome, ServiceCatalog, ServiceSynchronizer};

const UNCATEGORIZED: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRow {
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub status: &'static str,
    pub enabled: bool,
    pub system: bool,
    pub ram_estimate_mb: f64,
}

impl From<&Service> for ServiceRow {
    fn from(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            display_name: service.title().to_string(),
            category: if service.category.is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                service.category.clone()
            },
            status: service.status.label(),
            enabled: service.enabled,
            system: service.is_system(),
            ram_estimate_mb: service.ram_estimate_mb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub rows: Vec<ServiceRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RamTotals {
    pub enabled_count: usize,
    pub disabled_count: usize,
    /// RAM held by enabled services
    pub enabled_ram_mb: f64,
    /// RAM freed by disabled services
    pub disabled_ram_mb: f64,
}

fn matches_filter(service: &Service, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        service.name.as_str(),
        service.display_name.as_str(),
        service.category.as_str(),
        service.description.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn sort_rows(rows: &mut [ServiceRow]) {
    rows.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Rows grouped by category (alphabetical), each group sorted by display name
pub fn group_rows(catalog: &ServiceCatalog, filter: &str) -> Vec<CategoryGroup> {
    let needle = filter.trim().to_lowercase();
    let mut groups: BTreeMap<String, Vec<ServiceRow>> = BTreeMap::new();

    for service in catalog.services() {
        if !matches_filter(service, &needle) {
            continue;
        }
        let row = ServiceRow::from(service);
        groups.entry(row.category.clone()).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(category, mut rows)| {
            sort_rows(&mut rows);
            CategoryGroup { category, rows }
        })
        .collect()
}

pub fn ram_totals(catalog: &ServiceCatalog) -> RamTotals {
    let mut totals = RamTotals::default();
    for service in catalog.services() {
        if service.enabled {
            totals.enabled_count += 1;
            totals.enabled_ram_mb += service.ram_estimate_mb;
        } else {
            totals.disabled_count += 1;
            totals.disabled_ram_mb += service.ram_estimate_mb;
        }
    }
    totals
}

/// Rows for the disabled set only
pub fn disabled_rows(catalog: &ServiceCatalog) -> Vec<ServiceRow> {
    let mut rows: Vec<ServiceRow> = catalog
        .disabled()
        .iter()
        .filter_map(|name| catalog.get(name))
        .map(ServiceRow::from)
        .collect();
    sort_rows(&mut rows);
    rows
}

/// Plain-text table for terminals and logs
pub fn render_table(groups: &[CategoryGroup], totals: &RamTotals) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:<12} {:<8} {:>9}",
        "SERVICE", "STATUS", "STATE", "RAM (MB)"
    );

    for group in groups {
        let _ = writeln!(out, "[{}]", group.category);
        for row in &group.rows {
            let state = match (row.system, row.enabled) {
                (true, _) => "system",
                (false, true) => "on",
                (false, false) => "off",
            };
            let _ = writeln!(
                out,
                "  {:<22} {:<12} {:<8} {:>9.0}",
                row.display_name, row.status, state, row.ram_estimate_mb
            );
        }
    }

    let _ = writeln!(
        out,
        "{} enabled using {:.0} MB, {} disabled freeing {:.0} MB",
        totals.enabled_count, totals.enabled_ram_mb, totals.disabled_count, totals.disabled_ram_mb
    );
    out
}

/// Modal state over the synchronizer's catalog
pub struct ServiceManagerModal {
    sync: Arc<ServiceSynchronizer>,
    open: bool,
    filter: String,
}

impl ServiceManagerModal {
    pub fn new(sync: Arc<ServiceSynchronizer>) -> Self {
        Self {
            sync,
            open: false,
            filter: String::new(),
        }
    }

    pub fn open(&mut self) {
        debug!("Service manager opened");
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.filter.clear();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub async fn groups(&self) -> Vec<CategoryGroup> {
        let catalog = self.sync.catalog().await;
        group_rows(&catalog, &self.filter)
    }

    pub async fn totals(&self) -> RamTotals {
        let catalog = self.sync.catalog().await;
        ram_totals(&catalog)
    }

    pub async fn disabled_panel(&self) -> Vec<ServiceRow> {
        let catalog = self.sync.catalog().await;
        disabled_rows(&catalog)
    }

    pub async fn render(&self) -> String {
        let catalog = self.sync.catalog().await;
        render_table(&group_rows(&catalog, &self.filter), &ram_totals(&catalog))
    }

    /// Flip a row: enabled rows are disabled, disabled rows enabled
    pub async fn toggle(&self, name: &str) -> ActionOutcome {
        let Some(service) = self.sync.service(name).await else {
            warn!("Toggle requested for unmanaged service {}", name);
            return ActionOutcome::Failed(ApiError::ActionFailed {
                service: name.to_string(),
                message: "service is not managed by this dashboard".to_string(),
            });
        };
        if service.is_system() {
            return ActionOutcome::SystemService;
        }

        if service.enabled {
            self.sync.disable_service(name, false).await
        } else {
            self.sync.enable_service(name).await
        }
    }
}
