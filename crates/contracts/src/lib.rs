//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend only on this crate, never on each other's internals.
//!
//! ## Units
//! - Viewport dimensions are device-independent pixels, integral after clamping
//! - Durations in configuration are milliseconds

mod backend;
mod blueprint;
mod error;
mod session_id;
mod sync;
mod sync_engine_config;
mod viewport;

pub use backend::{LocalViewportBackend, ViewportBackend};
pub use blueprint::*;
pub use error::*;
pub use session_id::SessionId;
pub use sync::*;
pub use sync_engine_config::*;
pub use viewport::*;
