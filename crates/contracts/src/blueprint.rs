//! SessionBlueprint - Config Loader output
//!
//! Everything needed to stand up a viewport context for one recording
//! session: where the backend lives, sync tuning, and an optional known
//! driver viewport.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{ActualViewport, SessionId, ViewportSyncConfig};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Backend and session identity
    #[serde(default)]
    pub session: SessionConfig,

    /// Sync Manager tuning
    #[serde(default)]
    pub viewport: ViewportSyncConfig,

    /// Driver viewport known up front (e.g. from the session-creation response)
    #[serde(default)]
    pub actual_viewport: Option<ActualViewport>,
}

/// Backend endpoint and session identity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionConfig {
    /// Session to sync against; without one every sync is skipped
    #[serde(default)]
    pub id: Option<SessionId>,

    /// Base URL of the recording API (no trailing `/recordings`)
    #[serde(default = "default_api_url")]
    #[validate(url(message = "must be an absolute URL"))]
    pub api_url: String,
}

fn default_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: None,
            api_url: default_api_url(),
        }
    }
}
