use thiserror::Error;

/// Errors produced by the media pipeline.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The upload endpoint answered non-2xx, or the response body carried
    /// no `secure_url`.
    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    /// An upload for this owner is still in flight; the caller must wait
    /// for it to resolve before starting another.
    #[error("An upload for {0} is already in progress")]
    UploadInFlight(String),

    /// The picked file could not be read from disk.
    #[error("Could not read image file: {0}")]
    Io(#[from] std::io::Error),

    /// The device picker failed outright (distinct from user cancellation,
    /// which is a normal [`PickOutcome::Cancelled`](crate::PickOutcome)).
    #[error("Image picker error: {0}")]
    Picker(String),
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        MediaError::UploadFailed(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MediaError>;
