//! Wizard steps and their prompts.
//!
//! The wizard is linear with one binary fork (uniform vs. per-type window
//! counts) and one four-question walk. `DiffCount` carries the sash class
//! being asked so the walk needs no side state.

use serde::{Deserialize, Serialize};

use crate::dialog::{Reply, keyboard};
use crate::models::{OrderDraft, SashClass};
use crate::pricing;

/// The steps of the order wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Outside the wizard; only "new order" starts it.
    Idle,
    Entrance,
    Floor,
    Apartment,
    WindowsSameOrDifferent,
    /// "Same" path: pick the uniform sash class.
    SameSash,
    /// "Same" path: how many windows in total.
    SameCount,
    /// "Different" path: count for one class, asked in fixed order.
    DiffCount(SashClass),
    BalconyNeeded,
    BalconyGlazing,
    BalconySash,
    Nickname,
    Confirm,
}

impl Default for Step {
    fn default() -> Self {
        Self::Idle
    }
}

/// The fixed "use the buttons" reminder for out-of-step free text.
pub const USE_BUTTONS_REMINDER: &str = "Please use the buttons to continue.";

/// Top-level menu prompt.
pub fn main_menu_reply() -> Reply {
    Reply::with_keyboard("Main menu:", keyboard::main_menu())
}

/// Render the prompt for a step.
///
/// Pure over the draft, so "back" can re-render any prior step without
/// touching stored values.
pub fn prompt(step: Step, draft: &OrderDraft) -> Reply {
    match step {
        Step::Idle => main_menu_reply(),
        Step::Entrance => Reply::with_keyboard("Select your entrance:", keyboard::entrance()),
        Step::Floor => Reply::text("Enter your floor (1-24):"),
        Step::Apartment => Reply::text("Enter your apartment number (1-1500):"),
        Step::WindowsSameOrDifferent => Reply::with_keyboard(
            "Is the sash count the same on all your windows, or different?",
            keyboard::same_or_different(),
        ),
        Step::SameSash => Reply::with_keyboard(
            "Select the sash count of your windows:",
            keyboard::sash_classes(),
        ),
        Step::SameCount => {
            Reply::with_keyboard("How many windows in total? (0-6)", keyboard::counts())
        }
        Step::DiffCount(class) => Reply::with_keyboard(
            format!("How many {class} windows? (0-6)"),
            keyboard::counts(),
        ),
        Step::BalconyNeeded => Reply::with_keyboard(
            "Should we wash the balcony windows too?",
            keyboard::balcony_needed(),
        ),
        Step::BalconyGlazing => Reply::with_keyboard(
            "Are the balcony windows standard or floor-to-ceiling?",
            keyboard::balcony_glazing(),
        ),
        Step::BalconySash => Reply::with_keyboard(
            "Select the sash count of the balcony windows:",
            keyboard::sash_classes(),
        ),
        Step::Nickname => Reply::with_keyboard(
            "Enter your Telegram nickname (or press Skip):",
            keyboard::skip_nick(),
        ),
        Step::Confirm => Reply::with_keyboard(summary(draft), keyboard::confirmation()),
    }
}

/// Itemized order summary shown at the confirmation step.
fn summary(draft: &OrderDraft) -> String {
    let counts = draft
        .windows
        .map(|w| w.counts())
        .unwrap_or_default();

    let balcony_line = match (draft.balcony_count, draft.balcony_glazing, draft.balcony_sash) {
        (Some(0), _, _) | (None, _, _) => "Balconies: none".to_string(),
        (Some(count), glazing, sash) => format!(
            "Balconies: {count} ({}, {} windows)",
            glazing.map_or("?", |g| g.label()),
            sash.map_or("?", |s| s.label()),
        ),
    };

    let nickname_line = match draft.nickname.as_ref().and_then(|n| n.as_option()) {
        Some(nick) => format!("Contact: {nick}"),
        None => "Contact: not provided".to_string(),
    };

    let price_line = match pricing::price_draft(draft) {
        Ok(price) => format!("Total: {price}"),
        Err(_) => "Total: pending".to_string(),
    };

    format!(
        "Please confirm your order:\n\n\
         Entrance: {}\n\
         Floor: {}\n\
         Apartment: {}\n\n\
         Windows:\n\
         - 3-sash: {}\n\
         - 4-sash: {}\n\
         - 5-sash: {}\n\
         - 6-7-sash: {}\n\n\
         {balcony_line}\n\
         {nickname_line}\n\n\
         {price_line}",
        draft.entrance.map_or("?".to_string(), |e| e.to_string()),
        draft.floor.map_or("?".to_string(), |f| f.to_string()),
        draft.apartment.as_deref().unwrap_or("?"),
        counts.three,
        counts.four,
        counts.five,
        counts.six_seven,
    )
}
