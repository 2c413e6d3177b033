//! Session client error types

use thiserror::Error;

/// Errors raised while building a backend
#[derive(Debug, Error)]
pub enum SessionClientError {
    /// The API base URL cannot be used
    #[error("invalid api url '{url}': {message}")]
    InvalidApiUrl { url: String, message: String },

    /// HTTP client construction failed
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl SessionClientError {
    pub fn invalid_api_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidApiUrl {
            url: url.into(),
            message: message.into(),
        }
    }
}
