//! Account registration.
//!
//! One user-facing action covering up to three remote steps, in a fixed
//! order: optional image upload, then account creation, then the first
//! profile write. The order is the failure policy: the image goes first so
//! a failed upload never strands a half-registered account, and the
//! profile write goes last because it needs the uid the provider mints.
//!
//! A profile-write failure after the account exists is tolerated rather
//! than rolled back: fetch-or-default keeps such an account usable, and
//! [`Registrar::retry_profile_write`] lets the user finish the write
//! without re-entering anything.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use studybuddy_media::{ImageUploader, LocalImage};
use studybuddy_shared::constants::PLACEHOLDER_PHOTO_URL;
use studybuddy_shared::{NewProfile, UserId};
use studybuddy_store::ProfileRepository;

use crate::error::{ClientError, Result};
use crate::nav::Redirect;
use crate::provider::{IdentityProvider, ProviderError};
use crate::session::SessionManager;

/// Raw form fields for one registration attempt.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Picked but not yet uploaded. `None` means the profile gets the
    /// placeholder photo.
    pub image: Option<LocalImage>,
}

impl RegistrationForm {
    /// Local validation only; no remote calls happen here.
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(ClientError::Validation(
                "Please fill in all fields.".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(ClientError::Validation(
                "Passwords don't match.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where a registration attempt currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    Idle,
    Validating,
    UploadingImage,
    CreatingAccount,
    WritingProfile,
    Done,
    Failed(String),
}

/// Sequences one registration attempt end to end.
pub struct Registrar {
    provider: Arc<dyn IdentityProvider>,
    session: Arc<SessionManager>,
    profiles: ProfileRepository,
    uploader: Arc<dyn ImageUploader>,
    state: Mutex<RegistrationState>,
    /// Profile fields left unwritten by a failed final step.
    pending_profile: Mutex<Option<(UserId, NewProfile)>>,
}

impl Registrar {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        session: Arc<SessionManager>,
        profiles: ProfileRepository,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        Self {
            provider,
            session,
            profiles,
            uploader,
            state: Mutex::new(RegistrationState::Idle),
            pending_profile: Mutex::new(None),
        }
    }

    /// Current step, for the submitting screen to render.
    pub fn state(&self) -> RegistrationState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or(RegistrationState::Idle)
    }

    fn set_state(&self, state: RegistrationState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
    }

    fn fail(&self, err: ClientError) -> ClientError {
        self.set_state(RegistrationState::Failed(err.to_string()));
        err
    }

    /// Run the whole flow. On success the new account is the active
    /// session, its profile record exists, and the caller should redirect
    /// to sign-in.
    pub async fn register(&self, form: RegistrationForm) -> Result<Redirect> {
        self.set_state(RegistrationState::Validating);
        if let Err(e) = form.validate() {
            return Err(self.fail(e));
        }

        // Image first: if the upload fails, no account exists yet.
        let photo_url = match &form.image {
            Some(image) => {
                self.set_state(RegistrationState::UploadingImage);
                match self.upload_for_pending_account(image, &form.email).await {
                    Ok(url) => url,
                    Err(e) => return Err(self.fail(e)),
                }
            }
            None => PLACEHOLDER_PHOTO_URL.to_string(),
        };

        self.set_state(RegistrationState::CreatingAccount);
        let user = match self
            .provider
            .create_account(form.email.trim(), &form.password)
            .await
        {
            Ok(user) => user,
            Err(ProviderError::Rejected(code)) => {
                info!(code = %code, "Account creation rejected");
                return Err(self.fail(ClientError::AccountCreation(code)));
            }
            Err(ProviderError::Unavailable(reason)) => {
                return Err(self.fail(ClientError::RemoteUnavailable(reason)));
            }
        };

        // The new account becomes the active session before the profile
        // write, mirroring the provider's own behavior; subscribers see it.
        let session = self.session.adopt(user);

        self.set_state(RegistrationState::WritingProfile);
        let fields = NewProfile {
            fullname: form.name.trim().to_string(),
            email: session.email.clone(),
            profile_photo_url: photo_url,
        };
        self.write_profile(session.uid, fields).await
    }

    /// Re-run only the profile write after it failed post-account-creation.
    /// Earlier steps are not repeated.
    pub async fn retry_profile_write(&self) -> Result<Redirect> {
        let pending = self
            .pending_profile
            .lock()
            .ok()
            .and_then(|mut p| p.take());

        match pending {
            Some((uid, fields)) => {
                self.set_state(RegistrationState::WritingProfile);
                self.write_profile(uid, fields).await
            }
            None => Err(ClientError::Validation(
                "Nothing to retry.".to_string(),
            )),
        }
    }

    async fn write_profile(&self, uid: UserId, fields: NewProfile) -> Result<Redirect> {
        match self.profiles.create(&uid, &fields).await {
            Ok(()) => {
                info!(uid = %uid, "Registration complete");
                self.set_state(RegistrationState::Done);
                Ok(Redirect::SignIn)
            }
            Err(e) => {
                // Account exists, record doesn't. Not rolled back:
                // fetch-or-default keeps the account usable, and the
                // stashed fields make the write retryable as-is.
                warn!(uid = %uid, error = %e, "Profile write failed after account creation");
                if let Ok(mut pending) = self.pending_profile.lock() {
                    *pending = Some((uid, fields));
                }
                Err(self.fail(ClientError::from(e)))
            }
        }
    }

    /// Upload before the account exists, keyed by a provisional owner.
    ///
    /// The uid is not minted until account creation, so the pre-creation
    /// upload slots on the normalized email instead. A later photo change
    /// from the profile screen re-uploads under the real uid.
    async fn upload_for_pending_account(
        &self,
        image: &LocalImage,
        email: &str,
    ) -> Result<String> {
        let owner = UserId(email.trim().to_lowercase());
        let url = self.uploader.upload(image, &owner).await?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{FlakyDocumentStore, MockUploader, TestHarness};
    use studybuddy_shared::{ProfileRecord, Session, SessionState};

    fn form(name: &str, email: &str, password: &str, confirm: &str) -> RegistrationForm {
        RegistrationForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            image: None,
        }
    }

    fn registrar_with_uploader(h: &TestHarness, uploader: Arc<dyn ImageUploader>) -> Registrar {
        Registrar::new(
            h.provider.clone(),
            h.session.clone(),
            h.profiles.clone(),
            uploader,
        )
    }

    fn registrar(h: &TestHarness) -> Registrar {
        registrar_with_uploader(h, Arc::new(MockUploader::succeeding("https://img/x.jpg")))
    }

    #[tokio::test]
    async fn registration_without_image_writes_placeholder_profile() {
        let h = TestHarness::new();
        let r = registrar(&h);

        let redirect = r
            .register(form("Ada", "ada@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        assert_eq!(redirect, Redirect::SignIn);
        assert_eq!(r.state(), RegistrationState::Done);

        // The new account is the active session.
        let state = h.session.current();
        let uid = state.session().map(|s| s.uid.clone()).unwrap();

        let record = h
            .profiles
            .fetch_or_default(&Session {
                uid,
                email: "ada@x.com".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(record, ProfileRecord::Found(_)));
        let profile = record.profile();
        assert_eq!(profile.fullname.as_deref(), Some("Ada"));
        assert_eq!(profile.email, "ada@x.com");
        assert_eq!(profile.photo_url(), PLACEHOLDER_PHOTO_URL);
    }

    #[tokio::test]
    async fn password_mismatch_fails_before_any_remote_call() {
        let h = TestHarness::new();
        let r = registrar(&h);

        let err = r
            .register(form("Ada", "ada@x.com", "a", "b"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(err.to_string(), "Passwords don't match.");
        assert_eq!(h.provider.create_calls.load(Ordering::SeqCst), 0);
        assert!(h.store.is_empty());
        assert_eq!(
            r.state(),
            RegistrationState::Failed("Passwords don't match.".to_string())
        );
    }

    #[tokio::test]
    async fn blank_field_fails_validation() {
        let h = TestHarness::new();
        let r = registrar(&h);

        let err = r
            .register(form("", "ada@x.com", "secret1", "secret1"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Please fill in all fields.");
        assert_eq!(h.provider.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_upload_never_creates_an_account() {
        let h = TestHarness::new();
        let uploader = Arc::new(MockUploader::failing());
        let r = registrar_with_uploader(&h, uploader.clone());

        let mut f = form("Ada", "ada@x.com", "secret1", "secret1");
        f.image = Some(LocalImage::jpeg("/tmp/ada.jpg"));

        let err = r.register(f).await.unwrap_err();

        assert!(matches!(err, ClientError::Upload(_)));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.provider.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.session.current(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn uploaded_image_url_lands_on_the_profile() {
        let h = TestHarness::new();
        let r = registrar_with_uploader(
            &h,
            Arc::new(MockUploader::succeeding("https://img/ada.jpg")),
        );

        let mut f = form("Ada", "ada@x.com", "secret1", "secret1");
        f.image = Some(LocalImage::jpeg("/tmp/ada.jpg"));
        r.register(f).await.unwrap();

        let state = h.session.current();
        let session = state.session().unwrap();
        let record = h.profiles.fetch_or_default(session).await.unwrap();
        assert_eq!(record.profile().photo_url(), "https://img/ada.jpg");
    }

    #[tokio::test]
    async fn duplicate_email_reads_as_the_friendly_message() {
        let h = TestHarness::new();
        h.provider.with_account("ada@x.com", "secret1");
        let r = registrar(&h);

        let err = r
            .register(form("Ada", "ada@x.com", "secret1", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::AccountCreation(studybuddy_shared::AuthCode::EmailAlreadyInUse)
        ));
        assert_eq!(err.to_string(), "This email is already registered.");
    }

    #[tokio::test]
    async fn profile_write_failure_keeps_account_and_allows_retry() {
        let h = TestHarness::new();
        let flaky = Arc::new(FlakyDocumentStore::failing_sets(1));
        let profiles = ProfileRepository::new(flaky);
        let r = Registrar::new(
            h.provider.clone(),
            h.session.clone(),
            profiles.clone(),
            Arc::new(MockUploader::succeeding("https://img/x.jpg")),
        );

        let err = r
            .register(form("Ada", "ada@x.com", "secret1", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RemoteUnavailable(_)));
        assert!(matches!(r.state(), RegistrationState::Failed(_)));

        // The account was created and is the active session; only the
        // record is missing, and fetch-or-default degrades gracefully.
        let state = h.session.current();
        let session = state.session().expect("account should exist");
        let record = profiles.fetch_or_default(session).await.unwrap();
        assert!(record.is_synthesized());

        // The retry finishes the write without re-running earlier steps.
        let redirect = r.retry_profile_write().await.unwrap();
        assert_eq!(redirect, Redirect::SignIn);
        assert_eq!(r.state(), RegistrationState::Done);
        assert_eq!(h.provider.create_calls.load(Ordering::SeqCst), 1);

        let record = profiles.fetch_or_default(session).await.unwrap();
        assert_eq!(record.profile().display_name(), "Ada");
    }

    #[tokio::test]
    async fn retry_with_nothing_pending_is_an_error() {
        let h = TestHarness::new();
        let r = registrar(&h);
        assert!(r.retry_profile_write().await.is_err());
    }
}
