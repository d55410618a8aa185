//! Error types for the Gmail bindings.

use thiserror::Error;

/// Errors that can occur when talking to the remote mail source.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable session, or the token provider could not produce a token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {body}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Raw error body, if any.
        body: String,
    },

    /// A response payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error stems from a missing or rejected credential.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Api { status: 401, .. })
    }
}

/// Result type alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
