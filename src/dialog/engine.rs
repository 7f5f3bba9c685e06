//! The conversation engine.
//!
//! Given the current session and one user input (button token or free text),
//! validates the input against the step's domain, mutates the session, and
//! emits the next prompt. Pure over the session — all I/O lives in the
//! dispatch layer, which makes the whole wizard testable in-process.

use crate::dialog::{Reply, Session, Step, keyboard, step};
use crate::models::{Glazing, NewOrder, Nickname, SashClass, WindowConfig};
use crate::pricing;

/// One inbound user event, as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// Free text typed into the chat.
    Text(&'a str),
    /// A button token from an inline keyboard.
    Button(&'a str),
}

/// What the dispatch layer should do after a step was handled.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// State advanced (or rewound); send the prompt.
    Prompt(Reply),
    /// Validation failed; send the corrective message, state unchanged.
    Invalid(Reply),
    /// The user confirmed; persist the order and clear the session.
    Finalized(Box<NewOrder>),
    /// The user canceled; discard the session and send the farewell.
    Canceled(Reply),
}

/// Start (or restart) the wizard for this chat.
pub fn start(session: &mut Session) -> Reply {
    session.reset();
    session.step = Step::Entrance;
    step::prompt(Step::Entrance, &session.order)
}

/// Handle one input against the session's current step.
pub fn handle(session: &mut Session, input: Input<'_>) -> Outcome {
    if input == Input::Button(keyboard::TOKEN_BACK) {
        return back(session);
    }

    match session.step {
        Step::Idle => reminder(),
        Step::Entrance => handle_entrance(session, input),
        Step::Floor => handle_floor(session, input),
        Step::Apartment => handle_apartment(session, input),
        Step::WindowsSameOrDifferent => handle_same_or_different(session, input),
        Step::SameSash => handle_same_sash(session, input),
        Step::SameCount => handle_same_count(session, input),
        Step::DiffCount(class) => handle_diff_count(session, input, class),
        Step::BalconyNeeded => handle_balcony_needed(session, input),
        Step::BalconyGlazing => handle_balcony_glazing(session, input),
        Step::BalconySash => handle_balcony_sash(session, input),
        Step::Nickname => handle_nickname(session, input),
        Step::Confirm => handle_confirm(session, input),
    }
}

/// Pop the back-stack and re-render the popped step's prompt.
///
/// Stored values are deliberately not undone: going back and re-answering
/// overwrites a field only when the step is re-submitted.
fn back(session: &mut Session) -> Outcome {
    match session.pop_previous() {
        Some(prev) => Outcome::Prompt(step::prompt(prev, &session.order)),
        None => Outcome::Prompt(step::main_menu_reply()),
    }
}

fn advance(session: &mut Session, next: Step) -> Outcome {
    session.advance(next);
    Outcome::Prompt(step::prompt(next, &session.order))
}

/// Fixed reminder for free text in a button-only step or an unknown token.
fn reminder() -> Outcome {
    Outcome::Invalid(Reply::text(step::USE_BUTTONS_REMINDER))
}

// ── Step handlers ───────────────────────────────────────────────────

fn handle_entrance(session: &mut Session, input: Input<'_>) -> Outcome {
    let Input::Button(token) = input else {
        return reminder();
    };
    let Some(entrance) = token
        .strip_prefix(keyboard::PREFIX_ENTRANCE)
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=6).contains(n))
    else {
        return reminder();
    };
    session.order.entrance = Some(entrance);
    advance(session, Step::Floor)
}

fn handle_floor(session: &mut Session, input: Input<'_>) -> Outcome {
    let Input::Text(text) = input else {
        return reminder();
    };
    match text.trim().parse::<u8>() {
        Ok(floor) if (1..=24).contains(&floor) => {
            session.order.floor = Some(floor);
            advance(session, Step::Apartment)
        }
        _ => Outcome::Invalid(Reply::text("Invalid floor. Enter a number from 1 to 24:")),
    }
}

fn handle_apartment(session: &mut Session, input: Input<'_>) -> Outcome {
    let Input::Text(text) = input else {
        return reminder();
    };
    let text = text.trim();
    let digits_only = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit());
    let in_range = text
        .parse::<u16>()
        .is_ok_and(|apartment| (1..=1500).contains(&apartment));
    if !digits_only || !in_range {
        return Outcome::Invalid(Reply::text(
            "Invalid apartment number. Enter digits from 1 to 1500:",
        ));
    }
    session.order.apartment = Some(text.to_string());
    advance(session, Step::WindowsSameOrDifferent)
}

fn handle_same_or_different(session: &mut Session, input: Input<'_>) -> Outcome {
    match input {
        Input::Button(keyboard::TOKEN_WINDOWS_SAME) => advance(session, Step::SameSash),
        Input::Button(keyboard::TOKEN_WINDOWS_DIFFERENT) => {
            // Forced sequential walk through every class, zeros included.
            session.order.diff_counts = Default::default();
            advance(session, Step::DiffCount(SashClass::Three))
        }
        _ => reminder(),
    }
}

fn handle_same_sash(session: &mut Session, input: Input<'_>) -> Outcome {
    let Some(class) = sash_token(input) else {
        return reminder();
    };
    session.order.same_class = Some(class);
    advance(session, Step::SameCount)
}

fn handle_same_count(session: &mut Session, input: Input<'_>) -> Outcome {
    let Some(count) = count_token(input) else {
        return reminder();
    };
    let Some(class) = session.order.same_class else {
        // Unreachable in the normal flow; the SameSash handler always
        // sets the class before this step is entered.
        return reminder();
    };
    session.order.windows = Some(WindowConfig::Same { class, count });
    advance(session, Step::BalconyNeeded)
}

fn handle_diff_count(session: &mut Session, input: Input<'_>, class: SashClass) -> Outcome {
    let Some(count) = count_token(input) else {
        return reminder();
    };
    session.order.diff_counts.set(class, count);
    match class.next() {
        Some(next) => advance(session, Step::DiffCount(next)),
        None => {
            session.order.windows = Some(WindowConfig::Different {
                counts: session.order.diff_counts,
            });
            advance(session, Step::BalconyNeeded)
        }
    }
}

fn handle_balcony_needed(session: &mut Session, input: Input<'_>) -> Outcome {
    let Input::Button(token) = input else {
        return reminder();
    };
    let Some(count) = token
        .strip_prefix(keyboard::PREFIX_BALCONY)
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| *n <= 3)
    else {
        return reminder();
    };
    session.order.balcony_count = Some(count);
    if count == 0 {
        advance(session, Step::Nickname)
    } else {
        advance(session, Step::BalconyGlazing)
    }
}

fn handle_balcony_glazing(session: &mut Session, input: Input<'_>) -> Outcome {
    let Input::Button(token) = input else {
        return reminder();
    };
    let Some(glazing) = token
        .strip_prefix(keyboard::PREFIX_GLAZING)
        .and_then(Glazing::from_tag)
    else {
        return reminder();
    };
    session.order.balcony_glazing = Some(glazing);
    advance(session, Step::BalconySash)
}

fn handle_balcony_sash(session: &mut Session, input: Input<'_>) -> Outcome {
    let Some(sash) = sash_token(input) else {
        return reminder();
    };
    session.order.balcony_sash = Some(sash);
    advance(session, Step::Nickname)
}

fn handle_nickname(session: &mut Session, input: Input<'_>) -> Outcome {
    let nickname = match input {
        Input::Button(keyboard::TOKEN_SKIP_NICK) => Nickname::Skipped,
        Input::Button(_) => return reminder(),
        Input::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Outcome::Invalid(Reply::text(
                    "Enter a nickname, or press Skip:",
                ));
            }
            Nickname::Provided(text.to_string())
        }
    };
    session.order.nickname = Some(nickname);
    advance(session, Step::Confirm)
}

fn handle_confirm(session: &mut Session, input: Input<'_>) -> Outcome {
    match input {
        Input::Button(keyboard::TOKEN_CONFIRM) => {
            let order = pricing::price_draft(&session.order)
                .ok()
                .and_then(|price| session.order.finalize(price));
            match order {
                Some(order) => Outcome::Finalized(Box::new(order)),
                // Only reachable if the draft was corrupted mid-flight.
                None => Outcome::Invalid(Reply::text(
                    "Something went wrong with your order. Please start over.",
                )),
            }
        }
        Input::Button(keyboard::TOKEN_CANCEL) => Outcome::Canceled(Reply::with_keyboard(
            "Order canceled.",
            keyboard::main_menu(),
        )),
        _ => reminder(),
    }
}

// ── Token parsing ───────────────────────────────────────────────────

fn sash_token(input: Input<'_>) -> Option<SashClass> {
    match input {
        Input::Button(token) => token
            .strip_prefix(keyboard::PREFIX_SASH)
            .and_then(SashClass::from_tag),
        Input::Text(_) => None,
    }
}

fn count_token(input: Input<'_>) -> Option<u8> {
    match input {
        Input::Button(token) => token
            .strip_prefix(keyboard::PREFIX_COUNT)
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| *n <= 6),
        Input::Text(_) => None,
    }
}
