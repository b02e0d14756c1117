//! User gestures, confirmation prompts and onboarding

pub mod gesture_handler;
pub mod long_press;
pub mod prompt;
pub mod tour;

pub use gesture_handler::{GestureHandler, PressRelease};
pub use long_press::{LongPress, PointerButton, PressPhase, Transition};
pub use prompt::{ConfirmPrompt, FixedAnswer};
pub use tour::{Tour, TourState, TourStep};
