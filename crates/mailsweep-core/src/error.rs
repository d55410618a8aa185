//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Remote mail source operation failed.
    #[error("mail source error: {0}")]
    Source(#[from] mailsweep_gmail::Error),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// An attachment record is missing the id needed to fetch it.
    #[error("attachment has no attachment id: {0}")]
    MissingAttachmentId(String),

    /// Attachment payload was not valid base64.
    #[error("attachment data could not be decoded: {0}")]
    AttachmentDecode(String),
}

impl Error {
    /// Whether the underlying cause is a missing or rejected credential.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Source(source) if source.is_auth())
    }
}

/// Result type alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
