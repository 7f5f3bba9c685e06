//! Conversation engine — the wizard state machine and its session store.

pub mod engine;
pub mod keyboard;
pub mod session;
pub mod step;

pub use engine::{Input, Outcome};
pub use keyboard::{Button, Keyboard};
pub use session::{Session, SessionStore};
pub use step::Step;

/// A rendered prompt: message text plus an optional choice keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}
