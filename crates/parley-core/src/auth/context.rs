//! Shared in-memory session state.
//!
//! `SessionContext` is cloned into every part of the client that needs to
//! know who is signed in. Writers are last-writer-wins; readers either take
//! a snapshot or subscribe for change notification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::api::LoginResponse;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub logged_in: bool,
    pub user: Option<LoginResponse>,
    /// When the logged-in flag last flipped to true
    pub since: Option<DateTime<Utc>>,
}

/// Clone is cheap - all clones share the same state.
#[derive(Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.tx.borrow().logged_in
    }

    pub fn user(&self) -> Option<LoginResponse> {
        self.tx.borrow().user.clone()
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.tx.send_modify(|state| {
            if logged_in && !state.logged_in {
                state.since = Some(Utc::now());
            } else if !logged_in {
                state.since = None;
            }
            state.logged_in = logged_in;
        });
    }

    pub fn set_user(&self, user: Option<LoginResponse>) {
        self.tx.send_modify(|state| state.user = user);
    }

    /// Publish a signed-in user. The record lands before the flag, so no
    /// reader ever sees `logged_in` without a user.
    pub fn sign_in(&self, user: LoginResponse) {
        self.set_user(Some(user));
        self.set_logged_in(true);
    }

    /// Reset to the logged-out state
    pub fn clear(&self) {
        self.tx.send_replace(SessionState::default());
    }

    /// Receiver that is notified on every change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}
