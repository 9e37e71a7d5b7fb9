//! Authentication capability
//!
//! The session itself (login flow, token storage) belongs to an external
//! collaborator. This module only models the capability object it hands to
//! the client: a shared bearer token whose clearing cascade-cancels every
//! transport and poller that was opened under it.

use std::sync::Arc;

use tokio::sync::watch;

/// Never-authenticated, authenticated, or explicitly logged out.
///
/// The distinction between `Anonymous` and `LoggedOut` matters: public
/// viewers (an anonymous leaderboard page) must never be cancelled, while a
/// logout must cancel even components that only check in occasionally.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenState {
    Anonymous,
    Authenticated(String),
    LoggedOut,
}

/// Shared bearer-token capability.
///
/// Cloning is cheap; all clones observe the same token. `logout` clears the
/// token, and long-lived components watch for that state to shut themselves
/// down.
#[derive(Debug, Clone)]
pub struct AuthContext {
    state: Arc<watch::Sender<TokenState>>,
}

impl AuthContext {
    /// Create a context with no token (anonymous access)
    pub fn anonymous() -> Self {
        let (tx, _) = watch::channel(TokenState::Anonymous);
        Self { state: Arc::new(tx) }
    }

    /// Create a context pre-populated with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(TokenState::Authenticated(token.into()));
        Self { state: Arc::new(tx) }
    }

    /// Populate the token after a successful login
    pub fn login(&self, token: impl Into<String>) {
        self.state
            .send_replace(TokenState::Authenticated(token.into()));
    }

    /// Clear the token. Components holding this context observe the
    /// transition and cancel themselves.
    pub fn logout(&self) {
        // Logging out a never-authenticated context is a no-op; it must not
        // cancel anonymous viewers.
        self.state.send_if_modified(|state| {
            if matches!(state, TokenState::Authenticated(_)) {
                *state = TokenState::LoggedOut;
                tracing::info!("auth token cleared, cancelling dependent connections");
                true
            } else {
                false
            }
        });
    }

    /// Current token, if any
    pub fn token(&self) -> Option<String> {
        match &*self.state.borrow() {
            TokenState::Authenticated(token) => Some(token.clone()),
            _ => None,
        }
    }

    /// Resolve once the context has been logged out.
    ///
    /// Level-triggered: resolves immediately when the logout already
    /// happened, so pollers that check in between fetches cannot miss it.
    /// A context that is anonymous from the start never resolves here, so
    /// unauthenticated viewers (public leaderboards) are not cancelled.
    pub async fn logged_out(&self) {
        let mut rx = self.state.subscribe();
        loop {
            if *rx.borrow_and_update() == TokenState::LoggedOut {
                return;
            }
            if rx.changed().await.is_err() {
                // Context dropped entirely; treat as logout
                return;
            }
        }
    }
}
