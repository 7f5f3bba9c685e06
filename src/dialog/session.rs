//! Per-chat session state and the in-memory session store.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::dialog::Step;
use crate::models::OrderDraft;

/// Ephemeral conversation state for one chat.
///
/// Lives only for the duration of an active conversation; cleared on
/// confirmation or cancellation, never persisted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub step: Step,
    /// Stack of previously visited steps, for "back".
    history: Vec<Step>,
    pub order: OrderDraft,
}

impl Session {
    pub fn new(user_id: i64) -> Self {
        Self {
            order: OrderDraft::new(user_id),
            ..Self::default()
        }
    }

    /// Move to `next`, pushing the current step onto the back-stack.
    ///
    /// `Idle` is never pushed: backing out of the first question lands on
    /// the main menu, not on an empty wizard state.
    pub fn advance(&mut self, next: Step) {
        if self.step != Step::Idle {
            self.history.push(self.step);
        }
        self.step = next;
    }

    /// Pop the previous step for "back". The draft is left untouched —
    /// backtracking rewinds the prompt, not the stored values.
    pub fn pop_previous(&mut self) -> Option<Step> {
        let prev = self.history.pop()?;
        self.step = prev;
        Some(prev)
    }

    /// Restart the wizard with a fresh draft for the same user.
    pub fn reset(&mut self) {
        let user_id = self.order.user_id;
        *self = Session::new(user_id);
    }

    #[cfg(test)]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Concurrency-safe map of chat id → session.
///
/// A single mutex over the whole map: sessions are tiny, handlers are
/// non-blocking, and updates for one chat arrive sequentially anyway.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the chat's session, creating it on first use.
    pub fn with<R>(&self, chat_id: i64, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut map = self.inner.lock().expect("session store mutex poisoned");
        let session = map.entry(chat_id).or_insert_with(|| Session::new(chat_id));
        f(session)
    }

    /// Drop the chat's session (confirm / cancel).
    pub fn clear(&self, chat_id: i64) {
        let mut map = self.inner.lock().expect("session store mutex poisoned");
        map.remove(&chat_id);
    }

    pub fn contains(&self, chat_id: i64) -> bool {
        let map = self.inner.lock().expect("session store mutex poisoned");
        map.contains_key(&chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_pushes_previous_step() {
        let mut session = Session::new(1);
        session.advance(Step::Entrance); // Idle is not pushed
        session.advance(Step::Floor);
        session.advance(Step::Apartment);
        assert_eq!(session.history_len(), 2);
        assert_eq!(session.pop_previous(), Some(Step::Floor));
        assert_eq!(session.step, Step::Floor);
        assert_eq!(session.pop_previous(), Some(Step::Entrance));
        assert_eq!(session.pop_previous(), None);
    }

    #[test]
    fn reset_keeps_user_id() {
        let mut session = Session::new(99);
        session.advance(Step::Entrance);
        session.order.floor = Some(5);
        session.reset();
        assert_eq!(session.step, Step::Idle);
        assert_eq!(session.order.user_id, 99);
        assert_eq!(session.order.floor, None);
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn store_creates_on_first_use_and_clears() {
        let store = SessionStore::new();
        assert!(!store.contains(5));

        store.with(5, |s| {
            assert_eq!(s.step, Step::Idle);
            s.advance(Step::Entrance);
        });
        assert!(store.contains(5));
        store.with(5, |s| assert_eq!(s.step, Step::Entrance));

        store.clear(5);
        assert!(!store.contains(5));
        // Recreated fresh after clear
        store.with(5, |s| assert_eq!(s.step, Step::Idle));
    }

    #[test]
    fn store_keys_are_independent() {
        let store = SessionStore::new();
        store.with(1, |s| s.advance(Step::Entrance));
        store.with(2, |s| assert_eq!(s.step, Step::Idle));
        store.with(1, |s| assert_eq!(s.step, Step::Entrance));
    }

    #[test]
    fn store_is_safe_across_threads() {
        use std::sync::Arc;

        let store = Arc::new(SessionStore::new());
        let handles: Vec<_> = (0..8)
            .map(|chat_id| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.with(chat_id, |s| s.advance(Step::Entrance));
                        store.clear(chat_id);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
