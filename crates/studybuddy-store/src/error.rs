use thiserror::Error;

/// Errors produced by the store layer.
///
/// Absence of a record is not an error here; reads return `Option` and the
/// repository synthesizes a default on top of that.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport failure or a 5xx from the document store.
    #[error("Profile store unavailable: {0}")]
    RemoteUnavailable(String),

    /// The store answered with a status that is neither success nor 404.
    #[error("Profile store rejected the request: HTTP {0}")]
    UnexpectedStatus(u16),

    /// A record came back that does not decode into the expected shape.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::RemoteUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::MalformedRecord(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
