//! Access-token seam.
//!
//! Token acquisition and refresh (OAuth flows, keychains) live outside this
//! crate; the client only needs something that can produce a bearer token
//! right before each request.

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Produces a bearer token for each outgoing request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a currently-valid access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when no signed-in session exists or the
    /// token cannot be refreshed.
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token, for tests and short-lived sessions.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps an already-acquired token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        if self.0.is_empty() {
            return Err(Error::Auth("empty access token".into()));
        }
        Ok(self.0.clone())
    }
}
