use thiserror::Error;

use studybuddy_media::MediaError;
use studybuddy_shared::{friendly_message, AuthCode};
use studybuddy_store::StoreError;

/// Errors surfaced to the view layer.
///
/// Every remote-call failure is converted into one of these at the call
/// site; raw provider or transport errors never reach a screen. Each
/// variant's `Display` output is the inline message shown to the user.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Local form validation failed; no remote call was made.
    #[error("{0}")]
    Validation(String),

    /// The provider rejected the email/password pair. Deliberately generic:
    /// "no such user" and "wrong password" are not distinguished, so the
    /// response leaks nothing about account existence.
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,

    /// The provider refused to create the account.
    #[error("{}", friendly_message(.0))]
    AccountCreation(AuthCode),

    /// Transient transport or storage failure; retrying may succeed.
    #[error("Something went wrong. Please try again.")]
    RemoteUnavailable(String),

    /// The image step failed; the rest of the flow stays retryable.
    #[error("Couldn't upload your photo. Please try again.")]
    Upload(#[from] MediaError),

    /// Local token-store I/O failure.
    #[error("Something went wrong. Please try again.")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        ClientError::RemoteUnavailable(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
