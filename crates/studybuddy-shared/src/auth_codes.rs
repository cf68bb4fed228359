//! Identity-provider error codes and their user-facing translations.
//!
//! The provider reports rejections as short string codes. [`AuthCode`]
//! enumerates the known set; anything else lands in [`AuthCode::Other`] so
//! translation stays total. [`friendly_message`] is a pure mapping with no
//! I/O; the view layer renders its output verbatim.

use serde::{Deserialize, Serialize};

/// Error codes the identity provider is known to return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthCode {
    InvalidEmail,
    UserNotFound,
    WrongPassword,
    EmailAlreadyInUse,
    WeakPassword,
    /// Any code outside the known set. Kept verbatim for logging.
    Other(String),
}

impl AuthCode {
    /// Parse a provider code string.
    pub fn from_code(code: &str) -> Self {
        match code {
            "invalid-email" => AuthCode::InvalidEmail,
            "user-not-found" => AuthCode::UserNotFound,
            "wrong-password" => AuthCode::WrongPassword,
            "email-already-in-use" => AuthCode::EmailAlreadyInUse,
            "weak-password" => AuthCode::WeakPassword,
            other => AuthCode::Other(other.to_string()),
        }
    }

    /// The provider's wire representation of this code.
    pub fn as_code(&self) -> &str {
        match self {
            AuthCode::InvalidEmail => "invalid-email",
            AuthCode::UserNotFound => "user-not-found",
            AuthCode::WrongPassword => "wrong-password",
            AuthCode::EmailAlreadyInUse => "email-already-in-use",
            AuthCode::WeakPassword => "weak-password",
            AuthCode::Other(code) => code,
        }
    }
}

impl std::fmt::Display for AuthCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// Translate a provider code into the message shown to the user.
///
/// Total over all codes: unknown ones get the generic fallback.
pub fn friendly_message(code: &AuthCode) -> &'static str {
    match code {
        AuthCode::InvalidEmail => "Invalid email address.",
        AuthCode::UserNotFound => "No account found with this email.",
        AuthCode::WrongPassword => "Wrong password.",
        AuthCode::EmailAlreadyInUse => "This email is already registered.",
        AuthCode::WeakPassword => "Password should be at least 6 characters.",
        AuthCode::Other(_) => "Something went wrong. Please try again.",
    }
}
