use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Instant};
use tracing::{debug, info, warn};

use super::long_press::{LongPress, PointerButton, PressPhase, Transition};
use crate::constants::gesture::{CLICK_THRESHOLD, LONG_PRESS_DURATION, PROGRESS_TICK};
use crate::errors::ApiError;
use crate::model::is_system_service;
use crate::sync::{ActionOutcome, ServiceSynchronizer};
use crate::view::grid::{ServiceGrid, CLASS_LOADING, CLASS_LONG_PRESSING};

/// How a pointer release should be treated by the card's link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressRelease {
    /// Follow the link
    Click,
    /// Swallow the click
    Suppressed,
    /// No gesture on this card
    Ignored,
}

struct PressSession {
    timer: JoinHandle<()>,
    ticker: JoinHandle<()>,
    started_at: Instant,
}

impl PressSession {
    fn abort(self) {
        self.timer.abort();
        self.ticker.abort();
    }
}

struct CardGesture {
    container: String,
    machine: LongPress,
    session: Option<PressSession>,
    last_outcome: Option<ActionOutcome>,
}

/// Drives [`LongPress`] machines with real timers, one per attached card
pub struct GestureHandler {
    sync: Arc<ServiceSynchronizer>,
    grid: Arc<Mutex<ServiceGrid>>,
    hold_duration: Duration,
    click_threshold: Duration,
    cards: Mutex<HashMap<String, CardGesture>>,
}

impl GestureHandler {
    pub fn new(sync: Arc<ServiceSynchronizer>) -> Self {
        let grid = sync.grid();
        Self {
            sync,
            grid,
            hold_duration: LONG_PRESS_DURATION,
            click_threshold: CLICK_THRESHOLD,
            cards: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_hold_duration(mut self, hold_duration: Duration) -> Self {
        self.hold_duration = hold_duration;
        self
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    /// Attach a handler to a card. Idempotent; system services and unbound
    /// cards never get one. Returns whether a new handler was attached.
    pub async fn attach(&self, service_id: &str) -> bool {
        let Some(container) = self.sync.container_for(service_id).await else {
            debug!("Card {} is not bound to a container, no long-press", service_id);
            return false;
        };
        if is_system_service(&container) {
            debug!("Card {} is a system service, no long-press", service_id);
            return false;
        }

        let mut cards = self.cards.lock().await;
        if cards.contains_key(service_id) {
            return false;
        }
        cards.insert(
            service_id.to_string(),
            CardGesture {
                container,
                machine: LongPress::new(self.click_threshold),
                session: None,
                last_outcome: None,
            },
        );
        true
    }

    /// Attach to every card that currently offers long-press
    pub async fn attach_all(&self) -> usize {
        let ids: Vec<String> = {
            let grid = self.grid.lock().await;
            grid.cards()
                .iter()
                .filter(|c| c.long_press_enabled)
                .map(|c| c.service_id.clone())
                .collect()
        };

        let mut attached = 0;
        for id in ids {
            if self.attach(&id).await {
                attached += 1;
            }
        }
        if attached > 0 {
            info!("Attached long-press handlers to {} cards", attached);
        }
        attached
    }

    /// Attach after every render so cards created by later polls get a
    /// handler. Runs until the returned task is aborted.
    pub fn follow_renders(self: &Arc<Self>) -> JoinHandle<()> {
        let handler = self.clone();
        let mut renders = self.sync.subscribe_renders();
        tokio::spawn(async move {
            while renders.changed().await.is_ok() {
                handler.attach_all().await;
            }
        })
    }

    pub async fn is_attached(&self, service_id: &str) -> bool {
        self.cards.lock().await.contains_key(service_id)
    }

    pub async fn phase(&self, service_id: &str) -> Option<PressPhase> {
        self.cards.lock().await.get(service_id).map(|g| g.machine.phase())
    }

    pub async fn last_outcome(&self, service_id: &str) -> Option<ActionOutcome> {
        self.cards
            .lock()
            .await
            .get(service_id)
            .and_then(|g| g.last_outcome.clone())
    }

    /// Mouse-down / touch-start
    pub async fn press_start(self: &Arc<Self>, service_id: &str, button: PointerButton) -> bool {
        let now = Instant::now();
        let mut cards = self.cards.lock().await;
        let Some(gesture) = cards.get_mut(service_id) else {
            return false;
        };
        if gesture.machine.press_start(button, now) != Transition::Started {
            return false;
        }

        {
            let mut grid = self.grid.lock().await;
            if let Some(card) = grid.card_mut(service_id) {
                card.add_class(CLASS_LONG_PRESSING);
                card.press_progress = 0.0;
            }
        }

        let timer = {
            let handler = self.clone();
            let id = service_id.to_string();
            let hold = self.hold_duration;
            tokio::spawn(async move {
                sleep(hold).await;
                handler.fire(&id).await;
            })
        };
        let ticker = spawn_progress_ticker(self.grid.clone(), service_id, now, self.hold_duration);

        gesture.session = Some(PressSession {
            timer,
            ticker,
            started_at: now,
        });
        debug!("Long-press started on {}", service_id);
        true
    }

    /// Mouse-up / touch-end
    pub async fn press_end(&self, service_id: &str) -> PressRelease {
        let release = {
            let mut cards = self.cards.lock().await;
            let Some(gesture) = cards.get_mut(service_id) else {
                return PressRelease::Ignored;
            };

            match gesture.machine.press_end(Instant::now()) {
                Transition::Click => {
                    self.abort_session(service_id, gesture).await;
                    PressRelease::Click
                }
                Transition::Suppressed if gesture.session.is_some() => {
                    self.abort_session(service_id, gesture).await;
                    PressRelease::Suppressed
                }
                // Released after commit; the action path re-renders
                Transition::Suppressed => return PressRelease::Suppressed,
                _ => return PressRelease::Ignored,
            }
        };

        // Replay any poll the press held back
        self.sync.update_all_cards().await;
        release
    }

    /// Mouse-leave / touch-cancel: abort without navigating
    pub async fn cancel(&self, service_id: &str) -> bool {
        {
            let mut cards = self.cards.lock().await;
            let Some(gesture) = cards.get_mut(service_id) else {
                return false;
            };
            if gesture.machine.cancel() != Transition::Cancelled {
                return false;
            }
            self.abort_session(service_id, gesture).await;
        }

        self.sync.update_all_cards().await;
        true
    }

    async fn abort_session(&self, service_id: &str, gesture: &mut CardGesture) {
        if let Some(session) = gesture.session.take() {
            debug!(
                "Long-press on {} released after {:?}",
                service_id,
                session.started_at.elapsed()
            );
            session.abort();
        }
        let mut grid = self.grid.lock().await;
        if let Some(card) = grid.card_mut(service_id) {
            card.remove_class(CLASS_LONG_PRESSING);
            card.press_progress = 0.0;
        }
    }

    /// Countdown completed: toggle the service and settle the card
    async fn fire(&self, service_id: &str) {
        let container = {
            let mut cards = self.cards.lock().await;
            let Some(gesture) = cards.get_mut(service_id) else {
                return;
            };
            if gesture.machine.timer_fire() != Transition::Committed {
                return;
            }
            // Runs inside the timer task; only the ticker is stopped
            if let Some(session) = gesture.session.take() {
                session.ticker.abort();
            }
            gesture.machine.request_sent();
            gesture.container.clone()
        };

        {
            let mut grid = self.grid.lock().await;
            if let Some(card) = grid.card_mut(service_id) {
                card.remove_class(CLASS_LONG_PRESSING);
                card.add_class(CLASS_LOADING);
                card.press_progress = 1.0;
            }
        }

        let outcome = match self.sync.service(&container).await {
            Some(service) if service.enabled => {
                info!("Long-press committed: disabling {}", container);
                self.sync.disable_service(&container, false).await
            }
            Some(_) => {
                info!("Long-press committed: enabling {}", container);
                self.sync.enable_service(&container).await
            }
            None => {
                warn!("Long-press on {} but {} is not managed", service_id, container);
                ActionOutcome::Failed(ApiError::ActionFailed {
                    service: container.clone(),
                    message: "service is not managed by this dashboard".to_string(),
                })
            }
        };

        {
            let mut cards = self.cards.lock().await;
            if let Some(gesture) = cards.get_mut(service_id) {
                if outcome.is_completed() {
                    gesture.machine.response_ok();
                } else {
                    gesture.machine.response_err();
                }
                gesture.last_outcome = Some(outcome);
            }
        }

        {
            let mut grid = self.grid.lock().await;
            if let Some(card) = grid.card_mut(service_id) {
                card.remove_class(CLASS_LOADING);
                card.press_progress = 0.0;
            }
        }
        self.sync.update_all_cards().await;
    }
}

fn spawn_progress_ticker(
    grid: Arc<Mutex<ServiceGrid>>,
    service_id: &str,
    started_at: Instant,
    hold: Duration,
) -> JoinHandle<()> {
    let id = service_id.to_string();
    tokio::spawn(async move {
        let mut ticks = interval(PROGRESS_TICK);
        ticks.tick().await;
        loop {
            ticks.tick().await;
            let progress = (started_at.elapsed().as_secs_f32() / hold.as_secs_f32()).min(1.0);
            let mut grid = grid.lock().await;
            match grid.card_mut(&id) {
                Some(card) if card.is_long_pressing() => card.press_progress = progress,
                _ => break,
            }
        }
    })
}
