//! Image upload to the object-storage endpoint.
//!
//! One multipart POST per attempt: `{file, upload_preset, folder}`. The
//! destination is deterministic per owner (`{uid}.jpg` inside the configured
//! folder), so a re-upload overwrites the previous photo instead of
//! accumulating copies. Success means the response body carries a
//! `secure_url`; a 200 without one is still a failure.
//!
//! The guard below is process-local. Two devices uploading for the same
//! uid can still race on the shared slot; that is a known limitation of
//! the fixed per-uid naming, not something this layer resolves.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{info, warn};

use studybuddy_shared::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use studybuddy_shared::UserId;

use crate::error::{MediaError, Result};
use crate::picker::LocalImage;

/// Where an owner's most recent upload attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

/// Boundary for turning a picked image into a hosted URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload `image` into the owner's canonical slot and return the
    /// hosted URL. The URL is not persisted anywhere by this call.
    async fn upload(&self, image: &LocalImage, owner: &UserId) -> Result<String>;

    /// Whether an upload for `owner` is currently in flight. Callers use
    /// this to disable a second pick from the same surface.
    fn status(&self, owner: &UserId) -> UploadStatus;
}

/// Uploader backed by the deployment's HTTP upload endpoint.
pub struct CloudUploader {
    client: Client,
    endpoint: String,
    upload_preset: String,
    folder: String,
    statuses: Mutex<HashMap<UserId, UploadStatus>>,
}

impl CloudUploader {
    pub fn new(
        endpoint: impl Into<String>,
        upload_preset: impl Into<String>,
        folder: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MediaError::UploadFailed(format!("Failed to build client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            upload_preset: upload_preset.into(),
            folder: folder.into(),
            statuses: Mutex::new(HashMap::new()),
        })
    }

    /// Canonical file name for an owner's photo. One slot per user.
    pub fn slot_name(owner: &UserId) -> String {
        format!("{owner}.jpg")
    }

    /// Mark the owner's upload as started, rejecting a concurrent one.
    fn begin(&self, owner: &UserId) -> Result<()> {
        let mut statuses = self
            .statuses
            .lock()
            .map_err(|e| MediaError::UploadFailed(format!("Lock poisoned: {e}")))?;
        if statuses.get(owner) == Some(&UploadStatus::Uploading) {
            return Err(MediaError::UploadInFlight(owner.to_string()));
        }
        statuses.insert(owner.clone(), UploadStatus::Uploading);
        Ok(())
    }

    fn finish(&self, owner: &UserId, outcome: UploadStatus) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.insert(owner.clone(), outcome);
        }
    }

    async fn send(&self, image: &LocalImage, owner: &UserId) -> Result<String> {
        let bytes = tokio::fs::read(&image.path).await?;
        if bytes.is_empty() {
            return Err(MediaError::UploadFailed("Empty image file".to_string()));
        }

        let part = Part::bytes(bytes)
            .file_name(Self::slot_name(owner))
            .mime_str(&image.mime)
            .map_err(|e| MediaError::UploadFailed(format!("Bad MIME type: {e}")))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.folder.clone());

        let resp = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MediaError::UploadFailed(format!(
                "Upload endpoint answered {status}"
            )));
        }

        let body = resp.text().await?;
        parse_secure_url(&body)
    }
}

#[async_trait]
impl ImageUploader for CloudUploader {
    async fn upload(&self, image: &LocalImage, owner: &UserId) -> Result<String> {
        self.begin(owner)?;
        info!(owner = %owner, path = %image.path.display(), "Uploading profile photo");

        // No cancellation once started; wait for success or failure.
        let result = self.send(image, owner).await;
        match &result {
            Ok(url) => {
                info!(owner = %owner, url = %url, "Upload complete");
                self.finish(owner, UploadStatus::Succeeded);
            }
            Err(e) => {
                warn!(owner = %owner, error = %e, "Upload failed");
                self.finish(owner, UploadStatus::Failed);
            }
        }
        result
    }

    fn status(&self, owner: &UserId) -> UploadStatus {
        self.statuses
            .lock()
            .ok()
            .and_then(|s| s.get(owner).cloned())
            .unwrap_or(UploadStatus::Idle)
    }
}

/// Extract `secure_url` from the endpoint's JSON response.
///
/// A 2xx body without the field is a protocol-level failure.
fn parse_secure_url(body: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| MediaError::UploadFailed(format!("Malformed response body: {e}")))?;

    value
        .get("secure_url")
        .and_then(serde_json::Value::as_str)
        .map(String::from)
        .ok_or_else(|| MediaError::UploadFailed("Response has no secure_url".to_string()))
}
