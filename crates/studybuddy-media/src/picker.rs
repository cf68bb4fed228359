//! Device image picker boundary.
//!
//! The actual gallery/camera UI lives in the shell; this crate only sees
//! the outcome. User cancellation is a normal outcome, not an error.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

/// A locally picked image, not yet uploaded anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    /// Path to the image file on device storage.
    pub path: PathBuf,
    /// MIME type reported by the picker, e.g. `image/jpeg`.
    pub mime: String,
}

impl LocalImage {
    pub fn jpeg(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime: "image/jpeg".to_string(),
        }
    }
}

/// What came back from the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(LocalImage),
    Cancelled,
}

/// Boundary to the on-device image picker.
#[async_trait]
pub trait ImagePicker: Send + Sync {
    /// Ask the user to pick an image. Resolves to `Cancelled` when they
    /// back out; errors are reserved for picker malfunction.
    async fn pick_image(&self) -> Result<PickOutcome>;
}
