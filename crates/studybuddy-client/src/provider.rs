//! Identity provider boundary.
//!
//! The provider owns credentials and issues `{uid, email}` plus a refresh
//! token. Rejections arrive as enumerated string codes; everything else
//! (transport failures, 5xx) is `Unavailable`. The session manager and the
//! registration flow decide how each maps onto a user-visible error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use studybuddy_shared::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use studybuddy_shared::{AuthCode, UserId};

/// A confirmed identity as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: String,
    /// Opaque token exchanged for a fresh session on cold start.
    pub refresh_token: String,
}

/// Failure modes at the provider boundary.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider understood the request and said no.
    #[error("Provider rejected request: {0}")]
    Rejected(AuthCode),

    /// The provider could not be reached or answered 5xx.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new account for the credentials.
    async fn create_account(&self, email: &str, password: &str)
        -> Result<AuthUser, ProviderError>;

    /// Exchange credentials for a live identity.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError>;

    /// Exchange a persisted refresh token for a live identity.
    async fn restore(&self, refresh_token: &str) -> Result<AuthUser, ProviderError>;

    /// Revoke a refresh token. Best-effort; the local session is cleared
    /// regardless of the outcome.
    async fn sign_out(&self, refresh_token: &str) -> Result<(), ProviderError>;
}

#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshBody<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthUserBody {
    uid: String,
    email: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RejectionBody {
    code: String,
}

/// Identity provider backed by the deployment's HTTP API.
#[derive(Debug, Clone)]
pub struct RestIdentityProvider {
    client: Client,
    base_url: String,
}

impl RestIdentityProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("Failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_auth<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthUser, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            let user: AuthUserBody = resp
                .json()
                .await
                .map_err(|e| ProviderError::Unavailable(format!("Malformed response: {e}")))?;
            debug!(uid = %user.uid, "Provider confirmed credentials");
            return Ok(AuthUser {
                uid: UserId(user.uid),
                email: user.email,
                refresh_token: user.refresh_token,
            });
        }

        if status.is_client_error() {
            // Rejections carry an enumerated code; fall back to the raw
            // status when the body doesn't parse.
            let code = match resp.json::<RejectionBody>().await {
                Ok(rejection) => AuthCode::from_code(&rejection.code),
                Err(_) => AuthCode::Other(format!("http-{}", status.as_u16())),
            };
            return Err(ProviderError::Rejected(code));
        }

        Err(ProviderError::Unavailable(format!("POST {url}: {status}")))
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError> {
        self.post_auth("register", &CredentialsBody { email, password })
            .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError> {
        self.post_auth("login", &CredentialsBody { email, password })
            .await
    }

    async fn restore(&self, refresh_token: &str) -> Result<AuthUser, ProviderError> {
        self.post_auth("refresh", &RefreshBody { refresh_token })
            .await
    }

    async fn sign_out(&self, refresh_token: &str) -> Result<(), ProviderError> {
        let url = format!("{}/logout", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&RefreshBody { refresh_token })
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() || status.is_client_error() {
            // An already-revoked token is fine; the session dies either way.
            Ok(())
        } else {
            Err(ProviderError::Unavailable(format!("POST {url}: {status}")))
        }
    }
}
