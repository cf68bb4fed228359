//! The live authentication session and its observers.
//!
//! One `SessionManager` exists per process, constructed at startup and
//! passed by reference to everything that needs it. It owns the current
//! [`SessionState`]; all other components read it through a level-triggered
//! subscription: a new subscriber is called immediately with the current
//! state, then again on every change, in change order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::{info, warn};

use studybuddy_shared::{Session, SessionState, UserId};

use crate::error::{ClientError, Result};
use crate::provider::{AuthUser, IdentityProvider, ProviderError};
use crate::tokens::TokenStore;

type Handler = Arc<dyn Fn(&SessionState) + Send + Sync>;

struct SessionInner {
    state: Mutex<SessionState>,
    subscribers: Mutex<HashMap<u64, Handler>>,
    next_id: AtomicU64,
    // Serializes state change + fan-out, so no subscriber ever sees a
    // state older than one it has already received.
    dispatch: Mutex<()>,
}

/// Handle returned by [`SessionManager::subscribe`]. Dropping it releases
/// the subscription; a leaked handle keeps the handler alive against a
/// screen that no longer exists.
pub struct Subscription {
    id: u64,
    inner: Weak<SessionInner>,
}

impl Subscription {
    /// Release the subscription explicitly. Equivalent to dropping.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            if let Ok(mut subscribers) = inner.subscribers.lock() {
                subscribers.remove(&self.id);
            }
        }
    }
}

/// Owner of the live session.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    tokens: TokenStore,
    refresh_token: Mutex<Option<String>>,
    inner: Arc<SessionInner>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>, tokens: TokenStore) -> Self {
        Self {
            provider,
            tokens,
            refresh_token: Mutex::new(None),
            inner: Arc::new(SessionInner {
                state: Mutex::new(SessionState::SignedOut),
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                dispatch: Mutex::new(()),
            }),
        }
    }

    /// The current state, read once. Prefer [`subscribe`](Self::subscribe)
    /// for anything that must track changes.
    pub fn current(&self) -> SessionState {
        self.inner
            .state
            .lock()
            .map(|s| s.clone())
            .unwrap_or(SessionState::SignedOut)
    }

    /// Register a handler for session-state changes.
    ///
    /// Level-triggered: the handler runs once right here with the current
    /// state, then on every change until the returned [`Subscription`] is
    /// dropped. Handlers run on the task that changed the state and must
    /// not call back into subscribe/unsubscribe or the sign-in/out
    /// operations.
    pub fn subscribe(&self, handler: impl Fn(&SessionState) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let handler: Handler = Arc::new(handler);

        {
            let _order = self.inner.dispatch.lock();
            if let Ok(mut subscribers) = self.inner.subscribers.lock() {
                subscribers.insert(id, handler.clone());
            }
            let current = self.current();
            handler(&current);
        }

        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn set_state(&self, new_state: SessionState) {
        let _order = self.inner.dispatch.lock();
        if let Ok(mut state) = self.inner.state.lock() {
            *state = new_state.clone();
        }
        let handlers: Vec<Handler> = self
            .inner
            .subscribers
            .lock()
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default();
        for handler in handlers {
            handler(&new_state);
        }
    }

    /// Install a confirmed identity as the active session.
    ///
    /// Used by sign-in, cold-start restore, and account creation (the new
    /// account becomes the active session, which subscribers observe).
    pub fn adopt(&self, user: AuthUser) -> Session {
        if let Err(e) = self.tokens.save(&user.refresh_token) {
            // Session still works for this run; only restore is affected.
            warn!(error = %e, "Failed to persist session token");
        }
        if let Ok(mut token) = self.refresh_token.lock() {
            *token = Some(user.refresh_token);
        }

        let session = Session {
            uid: user.uid,
            email: user.email,
        };
        info!(uid = %session.uid, "Session established");
        self.set_state(SessionState::SignedIn(session.clone()));
        session
    }

    /// Exchange credentials for a session.
    ///
    /// Any provider rejection of the pair collapses into
    /// [`ClientError::InvalidCredentials`]; transport failures stay
    /// distinct so the user knows retrying might help.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        match self.provider.sign_in(email, password).await {
            Ok(user) => Ok(self.adopt(user)),
            Err(ProviderError::Rejected(code)) => {
                info!(code = %code, "Sign-in rejected");
                Err(ClientError::InvalidCredentials)
            }
            Err(ProviderError::Unavailable(reason)) => {
                Err(ClientError::RemoteUnavailable(reason))
            }
        }
    }

    /// Destroy the session and notify all subscribers.
    pub async fn sign_out(&self) -> Result<()> {
        let token = self
            .refresh_token
            .lock()
            .ok()
            .and_then(|mut t| t.take());

        if let Some(token) = token {
            // Best-effort revocation; the local session dies regardless.
            if let Err(e) = self.provider.sign_out(&token).await {
                warn!(error = %e, "Token revocation failed");
            }
        }
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to clear persisted token");
        }

        info!("Signed out");
        self.set_state(SessionState::SignedOut);
        Ok(())
    }

    /// Restore a session from the persisted token on cold start.
    ///
    /// Never fails outward: a missing token, a rejected token, or an
    /// unreachable provider all leave the manager signed out (the rejected
    /// token is discarded, the unreachable case keeps it for next launch).
    pub async fn restore(&self) -> SessionState {
        let token = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => return self.current(),
            Err(e) => {
                warn!(error = %e, "Could not read persisted token");
                return self.current();
            }
        };

        match self.provider.restore(&token.refresh_token).await {
            Ok(user) => {
                self.adopt(user);
            }
            Err(ProviderError::Rejected(code)) => {
                info!(code = %code, "Persisted token rejected, discarding");
                if let Err(e) = self.tokens.clear() {
                    warn!(error = %e, "Failed to clear rejected token");
                }
            }
            Err(ProviderError::Unavailable(reason)) => {
                warn!(reason = %reason, "Provider unreachable, staying signed out");
            }
        }
        self.current()
    }

    /// Uid of the signed-in user, if any. Convenience for call sites that
    /// only need the owner key.
    pub fn uid(&self) -> Option<UserId> {
        self.current().session().map(|s| s.uid.clone())
    }
}
