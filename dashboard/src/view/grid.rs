//! Service tiles as a renderer-independent view model

use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::CardConfig;
use crate::model::{is_system_service, Service, ServiceDetails};

pub const CLASS_LONG_PRESSING: &str = "long-pressing";
pub const CLASS_LOADING: &str = "loading";
pub const CLASS_UNMANAGED: &str = "unmanaged";
pub const CLASS_MISSING: &str = "missing";
const CLASS_ONLINE: &str = "status-online";
const CLASS_OFFLINE: &str = "status-offline";
const CLASS_DISABLED: &str = "status-disabled";
const STATUS_CLASSES: [&str; 3] = [CLASS_ONLINE, CLASS_OFFLINE, CLASS_DISABLED];

/// Client-visible state of one card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardState {
    Unknown,
    EnabledOnline,
    EnabledOffline,
    Disabled,
}

impl CardState {
    pub fn classify(service: Option<&Service>) -> Self {
        match service {
            None => CardState::Unknown,
            Some(s) if !s.enabled => CardState::Disabled,
            Some(s) if s.status.is_running() => CardState::EnabledOnline,
            Some(_) => CardState::EnabledOffline,
        }
    }

    fn class(&self) -> Option<&'static str> {
        match self {
            CardState::Unknown => None,
            CardState::EnabledOnline => Some(CLASS_ONLINE),
            CardState::EnabledOffline => Some(CLASS_OFFLINE),
            CardState::Disabled => Some(CLASS_DISABLED),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceCard {
    pub service_id: String,
    /// Container the card is bound to; `None` for static links
    pub data_service: Option<String>,
    pub href: Option<String>,
    pub classes: BTreeSet<String>,
    pub visible: bool,
    pub state: CardState,
    pub long_press_enabled: bool,
    /// Countdown fill, 0.0..=1.0, while a long-press is held
    pub press_progress: f32,
    pub details: Option<ServiceDetails>,
}

impl ServiceCard {
    pub fn new(service_id: &str, data_service: Option<&str>, href: Option<&str>) -> Self {
        Self {
            service_id: service_id.to_string(),
            data_service: data_service.map(str::to_string),
            href: href.map(str::to_string),
            classes: BTreeSet::new(),
            visible: true,
            state: CardState::Unknown,
            long_press_enabled: false,
            press_progress: 0.0,
            details: None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn is_long_pressing(&self) -> bool {
        self.has_class(CLASS_LONG_PRESSING)
    }

    /// Re-render against the canonical service (`None` when unmanaged).
    /// Returns `false` without touching the card while a press is held.
    pub fn render(&mut self, service: Option<&Service>, missing: bool) -> bool {
        if self.is_long_pressing() {
            return false;
        }

        let state = CardState::classify(service);
        for class in STATUS_CLASSES {
            self.remove_class(class);
        }
        if let Some(class) = state.class() {
            self.add_class(class);
        }

        if state == CardState::Unknown {
            self.add_class(CLASS_UNMANAGED);
            self.details = None;
        } else {
            self.remove_class(CLASS_UNMANAGED);
        }
        if missing {
            self.add_class(CLASS_MISSING);
        } else {
            self.remove_class(CLASS_MISSING);
        }

        // Disabled services move to the disabled-services panel
        self.visible = state != CardState::Disabled;
        self.long_press_enabled = match (&self.data_service, state) {
            (_, CardState::Unknown) => false,
            (Some(container), _) => !is_system_service(container),
            (None, _) => false,
        };
        self.state = state;
        true
    }
}

/// Every tile on the dashboard, in display order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceGrid {
    cards: Vec<ServiceCard>,
}

impl ServiceGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cards: &[CardConfig]) -> Self {
        let mut grid = Self::new();
        for card in cards {
            grid.add_card(ServiceCard::new(
                &card.service_id,
                Some(card.container_name()),
                card.href.as_deref(),
            ));
        }
        grid
    }

    /// Add a card unless one with the same id exists. Returns whether it was added.
    pub fn add_card(&mut self, card: ServiceCard) -> bool {
        if self.card(&card.service_id).is_some() {
            return false;
        }
        self.cards.push(card);
        true
    }

    /// Make sure every catalog service has a card to render into
    pub fn ensure_cards<'a, I>(&mut self, services: I) -> usize
    where
        I: IntoIterator<Item = &'a Service>,
    {
        let mut added = 0;
        for service in services {
            let bound = self
                .cards
                .iter()
                .any(|c| c.data_service.as_deref() == Some(service.name.as_str()));
            if !bound && self.add_card(ServiceCard::new(&service.name, Some(&service.name), None)) {
                added += 1;
            }
        }
        added
    }

    pub fn cards(&self) -> &[ServiceCard] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> impl Iterator<Item = &mut ServiceCard> {
        self.cards.iter_mut()
    }

    pub fn card(&self, service_id: &str) -> Option<&ServiceCard> {
        self.cards.iter().find(|c| c.service_id == service_id)
    }

    pub fn card_mut(&mut self, service_id: &str) -> Option<&mut ServiceCard> {
        self.cards.iter_mut().find(|c| c.service_id == service_id)
    }
}
