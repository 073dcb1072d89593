use std::sync::Arc;

use tokio::sync::watch;

use crate::features::auth::model::UserSession;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Present only while authenticated
    pub user: Option<UserSession>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Observable holder of the signed-in user
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<UserSession> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().user.is_some()
    }

    /// Set or clear the signed-in user; ends any pending auth request
    pub fn set_user(&self, user: Option<UserSession>) {
        self.state.send_modify(|s| {
            s.user = user;
            s.loading = false;
            s.error = None;
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|s| {
            if s.loading == loading {
                return false;
            }
            s.loading = loading;
            true
        });
    }

    pub fn set_error(&self, error: Option<String>) {
        self.state.send_modify(|s| {
            if error.is_some() {
                s.loading = false;
            }
            s.error = error;
        });
    }

    /// Reset to signed-out with no pending request or error
    pub fn clear(&self) {
        self.state.send_modify(|s| *s = SessionState::default());
    }
}
