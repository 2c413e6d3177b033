//! SyncState - Sync Manager output
//!
//! Published state of one session's viewport and the outcome of a sync attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Dimensions;

/// Observable state of a Sync Manager
///
/// Only the Sync Manager mutates this; consumers get copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Latest clamped viewport, `None` until the first sample
    pub viewport: Option<Dimensions>,

    /// Samples are arriving faster than the resize threshold
    pub is_resizing: bool,

    /// A backend request is in flight
    pub is_syncing: bool,

    /// Message of the last failed sync, cleared when a new attempt starts
    pub sync_error: Option<String>,
}

impl SyncState {
    /// Coarse lifecycle phase derived from the flags
    pub fn phase(&self) -> SyncPhase {
        if self.viewport.is_none() {
            SyncPhase::Uninitialized
        } else if self.is_syncing {
            SyncPhase::Syncing
        } else if self.sync_error.is_some() {
            SyncPhase::SyncFailed
        } else if self.is_resizing {
            SyncPhase::Observing
        } else {
            SyncPhase::Idle
        }
    }
}

/// Lifecycle phase of a session viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Uninitialized,
    Observing,
    Syncing,
    Idle,
    SyncFailed,
}

/// Why a sync attempt issued no request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No session to sync against
    NoSession,
    /// No viewport observed yet
    NoViewport,
    /// Equal to the last successfully synced viewport
    Unchanged,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::NoViewport => "no_viewport",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Result of a sync attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The backend accepted this viewport
    Synced(Dimensions),
    Skipped(SkipReason),
    /// The session was reset while the request was in flight; result discarded
    Stale,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synced(dims) => write!(f, "synced {dims}"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason.as_str()),
            Self::Stale => write!(f, "stale"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_progression() {
        let mut state = SyncState::default();
        assert_eq!(state.phase(), SyncPhase::Uninitialized);

        state.viewport = Some(Dimensions::new(1280, 720));
        state.is_resizing = true;
        assert_eq!(state.phase(), SyncPhase::Observing);

        state.is_resizing = false;
        state.is_syncing = true;
        assert_eq!(state.phase(), SyncPhase::Syncing);

        state.is_syncing = false;
        state.sync_error = Some("boom".into());
        assert_eq!(state.phase(), SyncPhase::SyncFailed);

        state.sync_error = None;
        assert_eq!(state.phase(), SyncPhase::Idle);
    }

    #[test]
    fn test_outcome_display() {
        let synced = SyncOutcome::Synced(Dimensions::new(800, 600));
        assert_eq!(synced.to_string(), "synced 800x600");
        let skipped = SyncOutcome::Skipped(SkipReason::NoSession);
        assert_eq!(skipped.to_string(), "skipped (no_session)");
    }
}
