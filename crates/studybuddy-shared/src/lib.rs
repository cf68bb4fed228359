//! # studybuddy-shared
//!
//! Domain types shared by every Study Buddy crate: the authenticated
//! session, the durable user profile, the identity provider's error-code
//! set and its user-facing translations, and cross-crate constants.

pub mod auth_codes;
pub mod constants;
pub mod types;

pub use auth_codes::{friendly_message, AuthCode};
pub use types::{NewProfile, Profile, ProfileRecord, Session, SessionState, UserId};
