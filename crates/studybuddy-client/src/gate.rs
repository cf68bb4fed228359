//! Shared behavior of every authenticated screen.
//!
//! A [`SessionGate`] is mounted alongside a screen. It subscribes to the
//! session manager; an absent session pushes one `Redirect::SignIn` onto
//! the screen's navigation channel, a present one makes [`SessionGate::sync`]
//! load the profile into view state. Dropping the gate releases the
//! subscription with it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use studybuddy_shared::{ProfileRecord, SessionState};
use studybuddy_store::ProfileRepository;

use crate::error::Result;
use crate::nav::{Navigator, Redirect};
use crate::session::{SessionManager, Subscription};

/// What the screen behind the gate should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Session present, profile not loaded yet.
    Loading,
    /// No session; a redirect to sign-in has been pushed.
    SignedOut,
    /// Session present and profile loaded.
    Ready(ProfileRecord),
}

struct GateShared {
    state: Mutex<GateState>,
    // One redirect per signed-out transition, however many state
    // deliveries repeat it.
    redirected: AtomicBool,
}

/// Session guard for one mounted screen.
pub struct SessionGate {
    session: Arc<SessionManager>,
    profiles: ProfileRepository,
    nav: Navigator,
    shared: Arc<GateShared>,
    _subscription: Subscription,
}

impl SessionGate {
    /// Subscribe to the session manager on behalf of a screen.
    ///
    /// If no one is signed in (now or later), exactly one
    /// [`Redirect::SignIn`] goes out per signed-out transition. Call
    /// [`sync`](Self::sync) after mounting (and after any sign-in) to load
    /// the profile.
    pub fn mount(
        session: Arc<SessionManager>,
        profiles: ProfileRepository,
        nav: Navigator,
    ) -> Self {
        let shared = Arc::new(GateShared {
            state: Mutex::new(GateState::Loading),
            redirected: AtomicBool::new(false),
        });

        let subscription = {
            let shared = shared.clone();
            let nav = nav.clone();
            session.subscribe(move |state| match state {
                SessionState::SignedOut => {
                    if let Ok(mut gate_state) = shared.state.lock() {
                        *gate_state = GateState::SignedOut;
                    }
                    if !shared.redirected.swap(true, Ordering::SeqCst) {
                        debug!("No session, redirecting to sign-in");
                        let _ = nav.send(Redirect::SignIn);
                    }
                }
                SessionState::SignedIn(_) => {
                    shared.redirected.store(false, Ordering::SeqCst);
                    if let Ok(mut gate_state) = shared.state.lock() {
                        *gate_state = GateState::Loading;
                    }
                }
            })
        };

        Self {
            session,
            profiles,
            nav,
            shared,
            _subscription: subscription,
        }
    }

    /// Load the profile for the current session into view state.
    ///
    /// Fetch-or-default means this succeeds for any authenticated session,
    /// record or no record. Signed out, it leaves the redirect logic to
    /// the subscription and does nothing.
    pub async fn sync(&self) -> Result<()> {
        let state = self.session.current();
        if let Some(session) = state.session() {
            let record = self.profiles.fetch_or_default(session).await?;
            if let Ok(mut gate_state) = self.shared.state.lock() {
                *gate_state = GateState::Ready(record);
            }
        }
        Ok(())
    }

    /// Current view state.
    pub fn state(&self) -> GateState {
        self.shared
            .state
            .lock()
            .map(|s| s.clone())
            .unwrap_or(GateState::Loading)
    }

    /// Sign out and send the user to the landing page.
    pub async fn logout(&self) -> Result<()> {
        self.session.sign_out().await?;
        let _ = self.nav.send(Redirect::Landing);
        Ok(())
    }
}
