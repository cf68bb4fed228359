//! # studybuddy-client
//!
//! Session and profile synchronization core of the Study Buddy client:
//! the session manager and its subscriptions, the identity-provider
//! boundary, the registration flow, the session gate shared by every
//! authenticated screen, and the photo-change flow.
//!
//! The shell (screens, navigation stack, widgets) sits on top of this
//! crate: it renders the states exposed here and acts on the redirects
//! pushed through [`nav`] channels.

pub mod config;
pub mod gate;
pub mod nav;
pub mod photo;
pub mod provider;
pub mod registration;
pub mod session;
pub mod tokens;

mod error;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use gate::{GateState, SessionGate};
pub use nav::Redirect;
pub use registration::{Registrar, RegistrationForm, RegistrationState};
pub use session::{SessionManager, Subscription};

use studybuddy_media::CloudUploader;
use studybuddy_shared::constants::UPLOAD_FOLDER;
use studybuddy_store::{ProfileRepository, RestDocumentStore};

use crate::provider::RestIdentityProvider;
use crate::tokens::TokenStore;

/// Install the global tracing subscriber. Call once at startup.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("studybuddy_client=debug,studybuddy_store=info,studybuddy_media=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Everything the shell needs, wired once at startup.
///
/// The session manager is the single process-wide instance; hand it (and
/// the rest) to screens by reference instead of reaching for globals.
pub struct StudyClient {
    pub session: Arc<SessionManager>,
    pub profiles: ProfileRepository,
    pub uploader: Arc<CloudUploader>,
    pub registrar: Registrar,
}

impl StudyClient {
    /// Wire the remote-backed client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let provider = Arc::new(
            RestIdentityProvider::new(config.auth_url.clone())
                .map_err(|e| ClientError::RemoteUnavailable(e.to_string()))?,
        );
        let store = Arc::new(RestDocumentStore::new(config.store_url.clone())?);
        let uploader = Arc::new(
            CloudUploader::new(
                config.upload_url.clone(),
                config.upload_preset.clone(),
                UPLOAD_FOLDER,
            )
            .map_err(ClientError::Upload)?,
        );

        let session = Arc::new(SessionManager::new(
            provider.clone(),
            TokenStore::open_default()?,
        ));
        let profiles = ProfileRepository::new(store);
        let registrar = Registrar::new(
            provider,
            session.clone(),
            profiles.clone(),
            uploader.clone(),
        );

        Ok(Self {
            session,
            profiles,
            uploader,
            registrar,
        })
    }

    /// Restore a persisted session, if one exists. Call once after
    /// construction, before mounting any gated screen.
    pub async fn restore_session(&self) {
        self.session.restore().await;
    }
}
