//! Onboarding tour

use std::sync::Arc;
use tracing::info;

use crate::stores::PreferencesStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourStep {
    pub id: &'static str,
    /// Card or panel the step points at
    pub target: &'static str,
    pub title: &'static str,
}

pub const DEFAULT_STEPS: [TourStep; 5] = [
    TourStep {
        id: "welcome",
        target: "status-banner",
        title: "Your server at a glance",
    },
    TourStep {
        id: "cards",
        target: "service-grid",
        title: "Open a service",
    },
    TourStep {
        id: "long-press",
        target: "service-grid",
        title: "Hold a card to turn it on or off",
    },
    TourStep {
        id: "favorites",
        target: "favorites",
        title: "Pin the services you use most",
    },
    TourStep {
        id: "manager",
        target: "service-manager",
        title: "Manage everything in one place",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourState {
    Inactive,
    Active { step: usize },
    Finished,
    Skipped,
}

pub struct Tour {
    preferences: Arc<PreferencesStore>,
    steps: Vec<TourStep>,
    state: TourState,
}

impl Tour {
    pub fn new(preferences: Arc<PreferencesStore>) -> Self {
        Self::with_steps(preferences, DEFAULT_STEPS.to_vec())
    }

    pub fn with_steps(preferences: Arc<PreferencesStore>, steps: Vec<TourStep>) -> Self {
        Self {
            preferences,
            steps,
            state: TourState::Inactive,
        }
    }

    pub fn state(&self) -> TourState {
        self.state
    }

    pub fn current(&self) -> Option<&TourStep> {
        match self.state {
            TourState::Active { step } => self.steps.get(step),
            _ => None,
        }
    }

    /// Start on first visit only
    pub async fn auto_start(&mut self) -> bool {
        if self.preferences.get().await.tour_completed {
            return false;
        }
        self.start().is_some()
    }

    /// Start from the first step, also when replaying a completed tour
    pub fn start(&mut self) -> Option<&TourStep> {
        if self.steps.is_empty() {
            return None;
        }
        self.state = TourState::Active { step: 0 };
        self.current()
    }

    /// Advance; moving past the last step finishes the tour
    pub async fn next(&mut self) -> Option<&TourStep> {
        let TourState::Active { step } = self.state else {
            return None;
        };
        if step + 1 >= self.steps.len() {
            self.finish().await;
            return None;
        }
        self.state = TourState::Active { step: step + 1 };
        self.current()
    }

    pub fn back(&mut self) -> Option<&TourStep> {
        if let TourState::Active { step } = self.state {
            self.state = TourState::Active {
                step: step.saturating_sub(1),
            };
        }
        self.current()
    }

    pub async fn skip(&mut self) {
        if let TourState::Active { step } = self.state {
            info!("Tour skipped at step {}", step);
            self.state = TourState::Skipped;
            self.preferences.set_tour_completed(true).await;
        }
    }

    pub async fn finish(&mut self) {
        if matches!(self.state, TourState::Active { .. }) {
            info!("Tour finished");
            self.state = TourState::Finished;
            self.preferences.set_tour_completed(true).await;
        }
    }
}
