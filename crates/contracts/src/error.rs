//! Layered error definitions
//!
//! Categorized by source: config / backend / sync

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Backend Errors =====
    /// The request never produced a response (connect, DNS, body encoding)
    #[error("viewport sync request failed: {message}")]
    BackendRequest { message: String },

    /// The backend answered with a non-success status
    #[error("viewport sync rejected with status {status}: {body}")]
    BackendStatus { status: u16, body: String },

    // ===== Sync Errors =====
    /// The backend did not answer within the request timeout
    #[error("viewport sync timed out after {waited_ms}ms")]
    SyncTimeout { waited_ms: u64 },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create backend request error
    pub fn backend_request(message: impl Into<String>) -> Self {
        Self::BackendRequest {
            message: message.into(),
        }
    }

    /// Create backend status error
    pub fn backend_status(status: u16, body: impl Into<String>) -> Self {
        Self::BackendStatus {
            status,
            body: body.into(),
        }
    }

    /// Whether the error came from talking to the backend (as opposed to local config/io)
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Self::BackendRequest { .. } | Self::BackendStatus { .. } | Self::SyncTimeout { .. }
        )
    }
}
