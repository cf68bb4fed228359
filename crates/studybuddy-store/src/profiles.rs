//! Profile reads and writes on top of the document store.
//!
//! `fetch_or_default` implements the one non-obvious rule of this layer:
//! an authenticated session always yields a profile. When no record exists
//! the repository builds one in memory from session fields instead of
//! failing; nothing is written in that case.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use studybuddy_shared::constants::{EMAIL_FIELD, FULLNAME_FIELD, PHOTO_URL_FIELD};
use studybuddy_shared::{NewProfile, Profile, ProfileRecord, Session, UserId};

use crate::document_store::{Document, DocumentStore};
use crate::error::Result;

/// Typed profile operations keyed by session identity.
#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProfileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Read the profile for the session's uid, or synthesize a default.
    ///
    /// Only transport/storage failures surface as errors; a missing record
    /// is the expected first-run case and produces
    /// [`ProfileRecord::Synthesized`] with fullname and photo unset.
    pub async fn fetch_or_default(&self, session: &Session) -> Result<ProfileRecord> {
        match self.store.get(&session.uid).await? {
            Some(doc) => {
                let profile = profile_from_document(&session.uid, &session.email, &doc);
                Ok(ProfileRecord::Found(profile))
            }
            None => {
                debug!(uid = %session.uid, "No profile record, synthesizing default");
                Ok(ProfileRecord::Synthesized(Profile {
                    uid: session.uid.clone(),
                    fullname: None,
                    email: session.email.clone(),
                    profile_photo_url: None,
                }))
            }
        }
    }

    /// Write a fresh profile record. A retry with the same uid overwrites
    /// the previous attempt rather than duplicating it.
    pub async fn create(&self, uid: &UserId, fields: &NewProfile) -> Result<()> {
        let mut doc = Document::new();
        doc.insert(FULLNAME_FIELD.into(), Value::String(fields.fullname.clone()));
        doc.insert(EMAIL_FIELD.into(), Value::String(fields.email.clone()));
        doc.insert(
            PHOTO_URL_FIELD.into(),
            Value::String(fields.profile_photo_url.clone()),
        );
        self.store.set(uid, doc).await
    }

    /// Partial update of a single field. Merge semantics: every field not
    /// named here survives unchanged.
    pub async fn update_field(&self, uid: &UserId, key: &str, value: &str) -> Result<()> {
        let mut doc = Document::new();
        doc.insert(key.to_string(), Value::String(value.to_string()));
        self.store.merge(uid, doc).await
    }
}

fn profile_from_document(uid: &UserId, session_email: &str, doc: &Document) -> Profile {
    let fullname = doc
        .get(FULLNAME_FIELD)
        .and_then(Value::as_str)
        .map(String::from);
    let email = match doc.get(EMAIL_FIELD).and_then(Value::as_str) {
        Some(email) => email.to_string(),
        None => {
            // Old records may miss the email field; the session still has it.
            warn!(uid = %uid, "Stored record has no email field");
            session_email.to_string()
        }
    };
    let profile_photo_url = doc
        .get(PHOTO_URL_FIELD)
        .and_then(Value::as_str)
        .map(String::from);

    Profile {
        uid: uid.clone(),
        fullname,
        email,
        profile_photo_url,
    }
}
