//! In-memory doubles for the external services, shared by the test
//! modules in this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use studybuddy_media::{
    ImagePicker, ImageUploader, LocalImage, MediaError, PickOutcome, UploadStatus,
};
use studybuddy_shared::{AuthCode, UserId};
use studybuddy_store::document_store::Document;
use studybuddy_store::{DocumentStore, MemoryDocumentStore, ProfileRepository, StoreError};

use crate::provider::{AuthUser, IdentityProvider, ProviderError};
use crate::session::SessionManager;
use crate::tokens::TokenStore;

#[derive(Clone)]
struct MockAccount {
    password: String,
    uid: UserId,
    refresh_token: String,
}

/// Identity provider double with an account table.
#[derive(Default)]
pub struct MockProvider {
    accounts: Mutex<HashMap<String, MockAccount>>,
    /// Total `create_account` invocations, for atomicity assertions.
    pub create_calls: AtomicUsize,
    reject_create: Mutex<Option<AuthCode>>,
    unavailable: AtomicBool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an account and return its uid.
    pub fn with_account(&self, email: &str, password: &str) -> UserId {
        let uid = UserId(format!("uid-{}", Uuid::new_v4()));
        let account = MockAccount {
            password: password.to_string(),
            uid: uid.clone(),
            refresh_token: format!("rt-{}", Uuid::new_v4()),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), account);
        uid
    }

    pub fn refresh_token_for(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .map(|a| a.refresh_token.clone())
    }

    /// Make the next `create_account` calls fail with `code`.
    pub fn reject_create_with(&self, code: AuthCode) {
        *self.reject_create.lock().unwrap() = Some(code);
    }

    /// Simulate the provider being unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<(), ProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(ProviderError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;

        if let Some(code) = self.reject_create.lock().unwrap().clone() {
            return Err(ProviderError::Rejected(code));
        }
        if self.accounts.lock().unwrap().contains_key(email) {
            return Err(ProviderError::Rejected(AuthCode::EmailAlreadyInUse));
        }
        if password.len() < 6 {
            return Err(ProviderError::Rejected(AuthCode::WeakPassword));
        }

        let uid = self.with_account(email, password);
        let refresh_token = self.refresh_token_for(email).unwrap();
        Ok(AuthUser {
            uid,
            email: email.to_string(),
            refresh_token,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError> {
        self.check_reachable()?;

        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(email)
            .ok_or(ProviderError::Rejected(AuthCode::UserNotFound))?;
        if account.password != password {
            return Err(ProviderError::Rejected(AuthCode::WrongPassword));
        }
        Ok(AuthUser {
            uid: account.uid.clone(),
            email: email.to_string(),
            refresh_token: account.refresh_token.clone(),
        })
    }

    async fn restore(&self, refresh_token: &str) -> Result<AuthUser, ProviderError> {
        self.check_reachable()?;

        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|(_, a)| a.refresh_token == refresh_token)
            .map(|(email, a)| AuthUser {
                uid: a.uid.clone(),
                email: email.clone(),
                refresh_token: a.refresh_token.clone(),
            })
            .ok_or_else(|| ProviderError::Rejected(AuthCode::Other("token-expired".to_string())))
    }

    async fn sign_out(&self, _refresh_token: &str) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Uploader double: succeeds with a fixed URL or always fails.
pub struct MockUploader {
    outcome: Result<String, ()>,
    pub calls: AtomicUsize,
}

impl MockUploader {
    pub fn succeeding(url: &str) -> Self {
        Self {
            outcome: Ok(url.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Err(()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageUploader for MockUploader {
    async fn upload(
        &self,
        _image: &LocalImage,
        _owner: &UserId,
    ) -> studybuddy_media::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(url) => Ok(url.clone()),
            Err(()) => Err(MediaError::UploadFailed("HTTP 500".to_string())),
        }
    }

    fn status(&self, _owner: &UserId) -> UploadStatus {
        UploadStatus::Idle
    }
}

/// Picker double resolving to a fixed outcome.
pub struct MockPicker {
    outcome: PickOutcome,
}

impl MockPicker {
    pub fn picking(path: &str) -> Self {
        Self {
            outcome: PickOutcome::Picked(LocalImage::jpeg(path)),
        }
    }

    pub fn cancelling() -> Self {
        Self {
            outcome: PickOutcome::Cancelled,
        }
    }
}

#[async_trait]
impl ImagePicker for MockPicker {
    async fn pick_image(&self) -> studybuddy_media::Result<PickOutcome> {
        Ok(self.outcome.clone())
    }
}

/// Document store double that fails a number of writes before recovering.
pub struct FlakyDocumentStore {
    inner: MemoryDocumentStore,
    failing_sets: AtomicUsize,
}

impl FlakyDocumentStore {
    /// Fail the next `n` `set` calls with `RemoteUnavailable`.
    pub fn failing_sets(n: usize) -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            failing_sets: AtomicUsize::new(n),
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyDocumentStore {
    async fn get(&self, uid: &UserId) -> studybuddy_store::Result<Option<Document>> {
        self.inner.get(uid).await
    }

    async fn set(&self, uid: &UserId, doc: Document) -> studybuddy_store::Result<()> {
        let remaining = self.failing_sets.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_sets.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::RemoteUnavailable("write timed out".to_string()));
        }
        self.inner.set(uid, doc).await
    }

    async fn merge(&self, uid: &UserId, doc: Document) -> studybuddy_store::Result<()> {
        self.inner.merge(uid, doc).await
    }
}

/// A session manager wired to mocks, with its token file in a temp dir.
pub struct TestHarness {
    pub provider: Arc<MockProvider>,
    pub store: Arc<MemoryDocumentStore>,
    pub profiles: ProfileRepository,
    pub session: Arc<SessionManager>,
    token_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let provider = Arc::new(MockProvider::new());
        let store = Arc::new(MemoryDocumentStore::new());
        let profiles = ProfileRepository::new(store.clone());
        let token_dir = tempfile::tempdir().unwrap();
        let session = Arc::new(SessionManager::new(
            provider.clone(),
            TokenStore::at_path(token_dir.path().join("session_token.json")),
        ));

        Self {
            provider,
            store,
            profiles,
            session,
            token_dir,
        }
    }

    /// A second manager over the same provider and token file, as if the
    /// process had been restarted.
    pub fn cold_start_manager(&self) -> Arc<SessionManager> {
        Arc::new(SessionManager::new(
            self.provider.clone(),
            TokenStore::at_path(self.token_dir.path().join("session_token.json")),
        ))
    }
}
