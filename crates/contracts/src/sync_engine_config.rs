//! Sync engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::{MAX_DIMENSION, MIN_DIMENSION};

/// Sync Manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_dimension_range"))]
pub struct ViewportSyncConfig {
    /// Lower clamp bound for both axes
    #[serde(default = "default_min_dimension")]
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub min_dimension: u32,

    /// Upper clamp bound for both axes
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Two samples closer than this are a resize burst
    #[serde(default = "default_resize_threshold_ms")]
    pub resize_threshold_ms: u64,

    /// Quiet period before the latest viewport is sent
    #[serde(default = "default_debounce_ms")]
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub debounce_ms: u64,

    /// Upper bound on a single backend request
    #[serde(default = "default_request_timeout_ms")]
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub request_timeout_ms: u64,
}

fn default_min_dimension() -> u32 {
    MIN_DIMENSION
}

fn default_max_dimension() -> u32 {
    MAX_DIMENSION
}

fn default_resize_threshold_ms() -> u64 {
    100
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn validate_dimension_range(config: &ViewportSyncConfig) -> Result<(), ValidationError> {
    if config.min_dimension > config.max_dimension {
        return Err(ValidationError::new("dimension_range").with_message(Cow::Owned(format!(
            "min_dimension ({}) must be <= max_dimension ({})",
            config.min_dimension, config.max_dimension
        ))));
    }
    Ok(())
}

impl Default for ViewportSyncConfig {
    fn default() -> Self {
        Self {
            min_dimension: default_min_dimension(),
            max_dimension: default_max_dimension(),
            resize_threshold_ms: default_resize_threshold_ms(),
            debounce_ms: default_debounce_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ViewportSyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn resize_threshold(&self) -> Duration {
        Duration::from_millis(self.resize_threshold_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
