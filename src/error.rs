/// Error types shared by the store, the relay and snapshot parsing
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Toggle by bare id when no stored record carries that id.
    #[error("Property not found")]
    NotFound { id: String },

    #[error("storage unavailable: {0}")]
    Backend(String),

    #[error("corrupt entry {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("message not delivered: {0}")]
    Disconnected(String),

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("unexpected reply to {0}")]
    UnexpectedReply(&'static str),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid page url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("page url has no host: {0}")]
    MissingHost(String),
}
