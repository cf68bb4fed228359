//! Keyed record storage, one JSON document per uid.
//!
//! The remote side exposes `GET`/`PUT`/`PATCH {base}/users/{uid}`. A GET
//! that finds nothing answers 404, which is surfaced as `None`, never as an
//! error. `set` is a full overwrite (idempotent under retry), `merge` is a
//! partial update that leaves unnamed fields untouched.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use studybuddy_shared::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, USERS_COLLECTION};
use studybuddy_shared::UserId;

use crate::error::{Result, StoreError};

/// A stored record: a flat JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Transport boundary for the remote document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the record for `uid`. Absence is `Ok(None)`.
    async fn get(&self, uid: &UserId) -> Result<Option<Document>>;

    /// Full write: replaces the record for `uid`, creating it if needed.
    async fn set(&self, uid: &UserId, doc: Document) -> Result<()>;

    /// Partial update: fields in `doc` are written, all others preserved.
    async fn merge(&self, uid: &UserId, doc: Document) -> Result<()>;
}

/// Document store backed by the deployment's HTTP API.
#[derive(Debug, Clone)]
pub struct RestDocumentStore {
    client: Client,
    base_url: String,
}

impl RestDocumentStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::RemoteUnavailable(format!("Failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn record_url(&self, uid: &UserId) -> String {
        format!("{}/{}/{}", self.base_url, USERS_COLLECTION, uid)
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn get(&self, uid: &UserId) -> Result<Option<Document>> {
        let url = self.record_url(uid);
        let resp = self.client.get(&url).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => {
                debug!(uid = %uid, "No stored record");
                Ok(None)
            }
            status if status.is_success() => {
                let doc: Document = resp.json().await?;
                Ok(Some(doc))
            }
            status if status.is_server_error() => {
                Err(StoreError::RemoteUnavailable(format!("GET {url}: {status}")))
            }
            status => Err(StoreError::UnexpectedStatus(status.as_u16())),
        }
    }

    async fn set(&self, uid: &UserId, doc: Document) -> Result<()> {
        let url = self.record_url(uid);
        let resp = self.client.put(&url).json(&doc).send().await?;

        let status = resp.status();
        if status.is_success() {
            debug!(uid = %uid, "Record written");
            Ok(())
        } else if status.is_server_error() {
            Err(StoreError::RemoteUnavailable(format!("PUT {url}: {status}")))
        } else {
            Err(StoreError::UnexpectedStatus(status.as_u16()))
        }
    }

    async fn merge(&self, uid: &UserId, doc: Document) -> Result<()> {
        let url = self.record_url(uid);
        let resp = self.client.patch(&url).json(&doc).send().await?;

        let status = resp.status();
        if status.is_success() {
            debug!(uid = %uid, fields = doc.len(), "Record merged");
            Ok(())
        } else if status.is_server_error() {
            Err(StoreError::RemoteUnavailable(format!("PATCH {url}: {status}")))
        } else {
            Err(StoreError::UnexpectedStatus(status.as_u16()))
        }
    }
}

/// In-memory document store for tests and offline development.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    records: Mutex<HashMap<UserId, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records. Test helper.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, uid: &UserId) -> Result<Option<Document>> {
        let records = self
            .records
            .lock()
            .map_err(|e| StoreError::RemoteUnavailable(format!("Lock poisoned: {e}")))?;
        Ok(records.get(uid).cloned())
    }

    async fn set(&self, uid: &UserId, doc: Document) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| StoreError::RemoteUnavailable(format!("Lock poisoned: {e}")))?;
        records.insert(uid.clone(), doc);
        Ok(())
    }

    async fn merge(&self, uid: &UserId, doc: Document) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| StoreError::RemoteUnavailable(format!("Lock poisoned: {e}")))?;
        let record = records.entry(uid.clone()).or_default();
        for (key, value) in doc {
            record.insert(key, value);
        }
        Ok(())
    }
}
