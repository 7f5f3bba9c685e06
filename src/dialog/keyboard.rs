//! Inline keyboards — opaque (label, token) button grids per wizard step.

use crate::models::{Glazing, SashClass};

// Stable button tokens. The transport round-trips these as callback data.
pub const TOKEN_NEW_ORDER: &str = "new_order";
pub const TOKEN_BACK: &str = "back";
pub const TOKEN_CONFIRM: &str = "confirm_order";
pub const TOKEN_CANCEL: &str = "cancel_order";
pub const TOKEN_SKIP_NICK: &str = "skip_nick";
pub const TOKEN_WINDOWS_SAME: &str = "windows_same";
pub const TOKEN_WINDOWS_DIFFERENT: &str = "windows_different";

pub const PREFIX_ENTRANCE: &str = "entrance_";
pub const PREFIX_SASH: &str = "sash_";
pub const PREFIX_COUNT: &str = "count_";
pub const PREFIX_BALCONY: &str = "balcony_";
pub const PREFIX_GLAZING: &str = "glazing_";

/// One pressable button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// A grid of buttons, rendered as a Telegram inline keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    /// Append the standard "Back" row.
    pub fn with_back(self) -> Self {
        self.row(vec![Button::new("Back", TOKEN_BACK)])
    }

    /// All tokens this keyboard can emit.
    pub fn tokens(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.token.as_str())
            .collect()
    }
}

/// Top-level menu: the only entry point into the wizard.
pub fn main_menu() -> Keyboard {
    Keyboard::new().row(vec![Button::new("New order", TOKEN_NEW_ORDER)])
}

pub fn entrance() -> Keyboard {
    let button = |n: u8| Button::new(format!("Entrance {n}"), format!("{PREFIX_ENTRANCE}{n}"));
    Keyboard::new()
        .row(vec![button(1), button(2), button(3)])
        .row(vec![button(4), button(5), button(6)])
        .with_back()
}

pub fn same_or_different() -> Keyboard {
    Keyboard::new()
        .row(vec![
            Button::new("All the same", TOKEN_WINDOWS_SAME),
            Button::new("Different", TOKEN_WINDOWS_DIFFERENT),
        ])
        .with_back()
}

/// One row per sash class.
pub fn sash_classes() -> Keyboard {
    let mut kb = Keyboard::new();
    for class in SashClass::ALL {
        kb = kb.row(vec![Button::new(
            class.label(),
            format!("{PREFIX_SASH}{}", class.tag()),
        )]);
    }
    kb.with_back()
}

pub fn counts() -> Keyboard {
    let button = |n: u8| Button::new(n.to_string(), format!("{PREFIX_COUNT}{n}"));
    Keyboard::new()
        .row(vec![button(0), button(1), button(2)])
        .row(vec![button(3), button(4), button(5)])
        .row(vec![button(6), Button::new("Back", TOKEN_BACK)])
}

pub fn balcony_needed() -> Keyboard {
    Keyboard::new()
        .row(vec![
            Button::new("1 balcony", format!("{PREFIX_BALCONY}1")),
            Button::new("2 balconies", format!("{PREFIX_BALCONY}2")),
        ])
        .row(vec![
            Button::new("3 balconies", format!("{PREFIX_BALCONY}3")),
            Button::new("Not needed", format!("{PREFIX_BALCONY}0")),
        ])
        .with_back()
}

pub fn balcony_glazing() -> Keyboard {
    Keyboard::new()
        .row(vec![
            Button::new("Standard", format!("{PREFIX_GLAZING}{}", Glazing::Standard.tag())),
            Button::new(
                "Floor-to-ceiling",
                format!("{PREFIX_GLAZING}{}", Glazing::FloorToCeiling.tag()),
            ),
        ])
        .with_back()
}

pub fn skip_nick() -> Keyboard {
    Keyboard::new()
        .row(vec![Button::new("Skip", TOKEN_SKIP_NICK)])
        .with_back()
}

pub fn confirmation() -> Keyboard {
    Keyboard::new().row(vec![
        Button::new("Confirm", TOKEN_CONFIRM),
        Button::new("Cancel", TOKEN_CANCEL),
    ])
}
