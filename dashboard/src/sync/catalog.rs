use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::constants::intervals::MISSED_POLL_GRACE;
use crate::model::Service;
use crate::view::grid::ServiceCard;

#[derive(Debug, Clone)]
struct CatalogEntry {
    service: Service,
    // consecutive polls this service was absent from
    missed_polls: u32,
}

/// Canonical view of every managed service, keyed by container name.
///
/// Immutable once built: each reconciliation produces a new catalog, and the
/// disabled set is derived from scratch every time.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    entries: HashMap<String, CatalogEntry>,
    disabled: BTreeSet<String>,
    sequence: u64,
    fetched_at: Option<DateTime<Utc>>,
}

/// What a reconciliation changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub missing: Vec<String>,
    pub removed: Vec<String>,
}

impl ServiceCatalog {
    /// Catalog built directly from a service list (cache seeding)
    pub fn from_services(services: Vec<Service>, sequence: u64, fetched_at: DateTime<Utc>) -> Self {
        let mut entries = HashMap::with_capacity(services.len());
        for service in services {
            entries.insert(
                service.name.clone(),
                CatalogEntry {
                    service,
                    missed_polls: 0,
                },
            );
        }
        Self::assemble(entries, sequence, Some(fetched_at))
    }

    fn assemble(
        entries: HashMap<String, CatalogEntry>,
        sequence: u64,
        fetched_at: Option<DateTime<Utc>>,
    ) -> Self {
        let disabled = entries
            .values()
            .filter(|e| !e.service.enabled)
            .map(|e| e.service.name.clone())
            .collect();
        Self {
            entries,
            disabled,
            sequence,
            fetched_at,
        }
    }

    /// Build the successor of `self` from a fresh poll.
    ///
    /// Services in `fetched` replace their previous entries wholesale. A
    /// service absent from the poll is carried over for up to
    /// [`MISSED_POLL_GRACE`] consecutive polls before it is dropped.
    pub fn reconcile(
        &self,
        fetched: Vec<Service>,
        sequence: u64,
        now: DateTime<Utc>,
    ) -> (ServiceCatalog, ReconcileReport) {
        let mut report = ReconcileReport::default();
        let mut entries = HashMap::with_capacity(fetched.len());

        for service in fetched {
            if !self.entries.contains_key(&service.name) {
                report.added.push(service.name.clone());
            }
            let name = service.name.clone();
            if entries
                .insert(
                    name.clone(),
                    CatalogEntry {
                        service,
                        missed_polls: 0,
                    },
                )
                .is_some()
            {
                warn!("Service list contains {} more than once, keeping the last", name);
            }
        }

        for (name, previous) in &self.entries {
            if entries.contains_key(name) {
                continue;
            }
            let missed_polls = previous.missed_polls + 1;
            if missed_polls <= MISSED_POLL_GRACE {
                debug!("{} missing from poll #{}, keeping last known state", name, sequence);
                report.missing.push(name.clone());
                entries.insert(
                    name.clone(),
                    CatalogEntry {
                        service: previous.service.clone(),
                        missed_polls,
                    },
                );
            } else {
                report.removed.push(name.clone());
            }
        }

        report.added.sort();
        report.missing.sort();
        report.removed.sort();
        (Self::assemble(entries, sequence, Some(now)), report)
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn get(&self, name: &str) -> Option<&Service> {
        self.entries.get(name).map(|e| &e.service)
    }

    /// Whether the service was absent from the latest poll but is still kept
    pub fn is_missing(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.missed_polls > 0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Services ordered by container name
    pub fn services(&self) -> Vec<&Service> {
        let mut services: Vec<_> = self.entries.values().map(|e| &e.service).collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        services
    }

    pub fn disabled(&self) -> &BTreeSet<String> {
        &self.disabled
    }

    /// The disabled set equals exactly the services with `enabled == false`
    pub fn disabled_set_consistent(&self) -> bool {
        let derived: BTreeSet<&String> = self
            .entries
            .values()
            .filter(|e| !e.service.enabled)
            .map(|e| &e.service.name)
            .collect();
        derived.len() == self.disabled.len() && self.disabled.iter().all(|n| derived.contains(n))
    }
}

/// Two-way mapping between card ids and container names
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    to_container: HashMap<String, String>,
    to_service_id: HashMap<String, String>,
}

impl IdMap {
    pub fn from_cards<'a, I>(cards: I) -> Self
    where
        I: IntoIterator<Item = &'a ServiceCard>,
    {
        let mut map = Self::default();
        for card in cards {
            let Some(container) = &card.data_service else {
                continue;
            };
            map.to_container
                .insert(card.service_id.clone(), container.clone());
            if let Some(existing) = map
                .to_service_id
                .insert(container.clone(), card.service_id.clone())
            {
                warn!(
                    "Cards {} and {} both bind container {}",
                    existing, card.service_id, container
                );
            }
        }
        map
    }

    pub fn container_for(&self, service_id: &str) -> Option<&str> {
        self.to_container.get(service_id).map(String::as_str)
    }

    pub fn service_id_for(&self, container: &str) -> Option<&str> {
        self.to_service_id.get(container).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.to_container.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_container.is_empty()
    }
}
