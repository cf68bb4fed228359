use serde::{Deserialize, Serialize};

use crate::constants::PLACEHOLDER_PHOTO_URL;

// User identity = opaque id issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A live authenticated identity. Created by the identity provider on
/// sign-in, account creation, or cold-start restore; destroyed on sign-out.
/// Owned exclusively by the session manager; everything else reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub uid: UserId,
    pub email: String,
}

/// Whether someone is currently authenticated, and as whom.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    SignedIn(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::SignedOut => None,
            SessionState::SignedIn(session) => Some(session),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionState::SignedIn(_))
    }
}

/// The durable record describing a user beyond their bare identity.
///
/// `uid` is immutable once the record exists; `fullname` and
/// `profile_photo_url` are optional with display-time fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uid: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    pub email: String,
    // Stored key is `profilePhotoURL`, not the camelCase default.
    #[serde(rename = "profilePhotoURL", skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
}

impl Profile {
    /// Name to show on screen: fullname when set, else the email.
    pub fn display_name(&self) -> &str {
        self.fullname.as_deref().unwrap_or(&self.email)
    }

    /// Photo URL to render: the stored URL when set, else the placeholder.
    pub fn photo_url(&self) -> &str {
        self.profile_photo_url
            .as_deref()
            .unwrap_or(PLACEHOLDER_PHOTO_URL)
    }
}

/// Fields written when a profile record is first created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub fullname: String,
    pub email: String,
    #[serde(rename = "profilePhotoURL")]
    pub profile_photo_url: String,
}

/// Result of a fetch-or-default read.
///
/// `Found` wraps a record loaded from the store; `Synthesized` wraps an
/// in-memory default built from session fields when no record exists.
/// Absence is an expected case, never an error. Most call sites only need
/// [`ProfileRecord::profile`] and treat the two the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileRecord {
    Found(Profile),
    Synthesized(Profile),
}

impl ProfileRecord {
    pub fn profile(&self) -> &Profile {
        match self {
            ProfileRecord::Found(p) | ProfileRecord::Synthesized(p) => p,
        }
    }

    pub fn into_profile(self) -> Profile {
        match self {
            ProfileRecord::Found(p) | ProfileRecord::Synthesized(p) => p,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self, ProfileRecord::Synthesized(_))
    }
}
