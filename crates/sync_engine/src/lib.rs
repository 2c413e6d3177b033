//! # Sync Engine
//!
//! Viewport synchronization for one live recording session.
//!
//! Responsibilities:
//! - Clamp noisy container size samples into a valid viewport
//! - Detect resize bursts
//! - Debounce backend sync, at most one request in flight
//! - Forced sync bypassing the debounce
//!
//! ## Example
//!
//! ```ignore
//! use sync_engine::{SyncManager, ViewportSyncConfig};
//!
//! let manager = SyncManager::new(ViewportSyncConfig::default(), Some("rec-1".into()), backend);
//!
//! // Container resized
//! manager.update_from_bounds(RawBounds::new(1280.4, 719.8));
//! assert_eq!(manager.state().viewport, Some(Dimensions::new(1280, 720)));
//!
//! // Push now instead of waiting for the debounce
//! manager.force_sync().await?;
//! ```

mod counters;
mod dimensions;
mod engine;

pub use counters::{CountersSnapshot, SyncCounters};
pub use dimensions::{aspect_ratio, clamp_dimensions, fit_viewport_to_bounds, viewports_equal};
pub use engine::SyncManager;

// Re-export contracts types
pub use contracts::{
    Dimensions, RawBounds, SessionId, SkipReason, SyncOutcome, SyncState, ViewportBackend,
    ViewportSyncConfig, MAX_DIMENSION, MIN_DIMENSION,
};
