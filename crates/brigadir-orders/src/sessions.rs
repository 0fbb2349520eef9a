// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process store for active form sessions.
//!
//! Keyed by chat id; each conversation sees only its own session, so no
//! locking beyond the map shards is needed. Sessions are created by
//! `/new_order`, mutated by flow handlers, and torn down exactly once on
//! confirm or cancel. There is no background expiry: an abandoned
//! session stays until the manager cancels or starts over.

use std::sync::Arc;

use dashmap::DashMap;

use crate::form::OrderForm;

/// Conversation-scoped form session store.
#[derive(Clone, Default)]
pub struct FormSessions {
    inner: Arc<DashMap<i64, OrderForm>>,
}

impl FormSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session for the chat, discarding any previous one.
    pub fn begin(&self, chat_id: i64) -> OrderForm {
        let form = OrderForm::new();
        self.inner.insert(chat_id, form.clone());
        form
    }

    /// Whether the chat currently has an active session.
    pub fn contains(&self, chat_id: i64) -> bool {
        self.inner.contains_key(&chat_id)
    }

    /// Run `f` against the chat's session, if one exists.
    pub fn update<R>(&self, chat_id: i64, f: impl FnOnce(&mut OrderForm) -> R) -> Option<R> {
        self.inner.get_mut(&chat_id).map(|mut entry| f(&mut entry))
    }

    /// Remove and return the chat's session (confirm/cancel teardown).
    pub fn take(&self, chat_id: i64) -> Option<OrderForm> {
        self.inner.remove(&chat_id).map(|(_, form)| form)
    }
}

/// Conversation-scoped photo-capture sub-session store.
///
/// A master opens a before/after capture from the in-progress keyboard;
/// every photo sent afterwards lands in that order's log under the
/// chosen kind until the capture is replaced or ended.
#[derive(Clone, Default)]
pub struct CaptureSessions {
    inner: Arc<DashMap<i64, (i64, brigadir_core::PhotoKind)>>,
}

impl CaptureSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the chat's next photos at the given order and kind,
    /// replacing any previous capture target.
    pub fn begin(&self, chat_id: i64, order_id: i64, kind: brigadir_core::PhotoKind) {
        self.inner.insert(chat_id, (order_id, kind));
    }

    /// The chat's current capture target, if any.
    pub fn target(&self, chat_id: i64) -> Option<(i64, brigadir_core::PhotoKind)> {
        self.inner.get(&chat_id).map(|entry| *entry)
    }

    /// Drop the chat's capture target.
    pub fn end(&self, chat_id: i64) {
        self.inner.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use brigadir_core::{City, PhotoKind};

    use super::*;
    use crate::form::FormStep;

    #[test]
    fn begin_update_take_lifecycle() {
        let sessions = FormSessions::new();
        assert!(!sessions.contains(1));

        sessions.begin(1);
        assert!(sessions.contains(1));

        sessions
            .update(1, |form| form.set_city(City::Omsk))
            .unwrap()
            .unwrap();
        let step = sessions.update(1, |form| form.step()).unwrap();
        assert_eq!(step, FormStep::Date);

        let form = sessions.take(1).unwrap();
        assert_eq!(form.city, Some(City::Omsk));
        assert!(!sessions.contains(1));
        assert!(sessions.take(1).is_none());
    }

    #[test]
    fn begin_discards_previous_session() {
        let sessions = FormSessions::new();
        sessions.begin(1);
        sessions
            .update(1, |form| form.set_city(City::Kazan))
            .unwrap()
            .unwrap();

        sessions.begin(1);
        let step = sessions.update(1, |form| form.step()).unwrap();
        assert_eq!(step, FormStep::City);
    }

    #[test]
    fn sessions_are_isolated_per_chat() {
        let sessions = FormSessions::new();
        sessions.begin(1);
        sessions.begin(2);

        sessions
            .update(1, |form| form.set_city(City::Moscow))
            .unwrap()
            .unwrap();

        let step_two = sessions.update(2, |form| form.step()).unwrap();
        assert_eq!(step_two, FormStep::City);
    }

    #[test]
    fn update_on_missing_session_is_none() {
        let sessions = FormSessions::new();
        assert!(sessions.update(9, |form| form.step()).is_none());
    }

    #[test]
    fn capture_target_replaces_and_ends() {
        let captures = CaptureSessions::new();
        assert_eq!(captures.target(1), None);

        captures.begin(1, 5, PhotoKind::Before);
        assert_eq!(captures.target(1), Some((5, PhotoKind::Before)));

        captures.begin(1, 5, PhotoKind::After);
        assert_eq!(captures.target(1), Some((5, PhotoKind::After)));

        captures.end(1);
        assert_eq!(captures.target(1), None);
    }
}
