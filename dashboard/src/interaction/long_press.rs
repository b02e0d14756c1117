//! Long-press state machine, free of timers and rendering.
//!
//! ```text
//! idle --press_start--> pressing --timer_fire--> committed --request_sent-->
//!   awaiting_result --response_ok/err--> settled --press_start--> pressing
//! pressing --press_end/cancel--> idle
//! ```
//!
//! The driver in [`super::gesture_handler`] feeds it events and acts on the
//! returned [`Transition`].

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    /// Touch contacts count as primary
    Touch,
}

impl PointerButton {
    fn is_primary(&self) -> bool {
        matches!(self, PointerButton::Primary | PointerButton::Touch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressPhase {
    Idle,
    Pressing { started_at: Instant },
    Committed,
    AwaitingResult,
    Settled { succeeded: bool },
}

/// What the driver has to do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Event does not apply in the current phase
    Ignored,
    /// Start the countdown
    Started,
    /// Short tap released: let the click navigate
    Click,
    /// Hold released before commit: swallow the click
    Suppressed,
    /// Aborted without a release (pointer left, touch cancelled)
    Cancelled,
    /// Countdown completed: run the action
    Committed,
    Dispatched,
    Settled { succeeded: bool },
}

#[derive(Debug, Clone)]
pub struct LongPress {
    phase: PressPhase,
    click_threshold: Duration,
}

impl LongPress {
    pub fn new(click_threshold: Duration) -> Self {
        Self {
            phase: PressPhase::Idle,
            click_threshold,
        }
    }

    pub fn phase(&self) -> PressPhase {
        self.phase
    }

    /// A press can only begin while nothing is in flight
    pub fn press_start(&mut self, button: PointerButton, now: Instant) -> Transition {
        if !button.is_primary() {
            return Transition::Ignored;
        }
        match self.phase {
            PressPhase::Idle | PressPhase::Settled { .. } => {
                self.phase = PressPhase::Pressing { started_at: now };
                Transition::Started
            }
            _ => Transition::Ignored,
        }
    }

    pub fn press_end(&mut self, now: Instant) -> Transition {
        match self.phase {
            PressPhase::Pressing { started_at } => {
                self.phase = PressPhase::Idle;
                if now.saturating_duration_since(started_at) < self.click_threshold {
                    Transition::Click
                } else {
                    Transition::Suppressed
                }
            }
            // Release after the action fired never navigates
            PressPhase::Committed | PressPhase::AwaitingResult | PressPhase::Settled { .. } => {
                Transition::Suppressed
            }
            _ => Transition::Ignored,
        }
    }

    pub fn cancel(&mut self) -> Transition {
        match self.phase {
            PressPhase::Pressing { .. } => {
                self.phase = PressPhase::Idle;
                Transition::Cancelled
            }
            _ => Transition::Ignored,
        }
    }

    /// A timer that outlived its press is ignored
    pub fn timer_fire(&mut self) -> Transition {
        match self.phase {
            PressPhase::Pressing { .. } => {
                self.phase = PressPhase::Committed;
                Transition::Committed
            }
            _ => Transition::Ignored,
        }
    }

    pub fn request_sent(&mut self) -> Transition {
        match self.phase {
            PressPhase::Committed => {
                self.phase = PressPhase::AwaitingResult;
                Transition::Dispatched
            }
            _ => Transition::Ignored,
        }
    }

    pub fn response_ok(&mut self) -> Transition {
        self.settle(true)
    }

    pub fn response_err(&mut self) -> Transition {
        self.settle(false)
    }

    fn settle(&mut self, succeeded: bool) -> Transition {
        match self.phase {
            PressPhase::AwaitingResult => {
                self.phase = PressPhase::Settled { succeeded };
                Transition::Settled { succeeded }
            }
            _ => Transition::Ignored,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            PressPhase::Committed | PressPhase::AwaitingResult
        )
    }
}
