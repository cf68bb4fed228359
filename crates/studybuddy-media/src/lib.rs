//! # studybuddy-media
//!
//! Profile-photo handling for the Study Buddy client: picking an image on
//! the device and turning it into a hosted URL.
//!
//! The pipeline stops at the URL. Persisting it onto a profile record is
//! the caller's job, which keeps upload and persistence independently
//! retryable.

pub mod picker;
pub mod upload;

mod error;

pub use error::{MediaError, Result};
pub use picker::{ImagePicker, LocalImage, PickOutcome};
pub use upload::{CloudUploader, ImageUploader, UploadStatus};
