//! # Viewport Context
//!
//! One coherent viewport picture for UI-side consumers of a recording session.
//!
//! Responsibilities:
//! - Own the session's `SyncManager` and relay its viewport as the browser viewport
//! - Hold the actual viewport reported by the driver
//! - Detect and explain requested/actual mismatches
//! - Scope access: a strict accessor for code that needs a session, an
//!   optional one for code that may run without it
//!
//! ## Example
//!
//! ```ignore
//! let scope = ViewportScope::provide(props, backend);
//!
//! // Deep inside a component tree that always has a session:
//! let viewport = scope.use_viewport();
//! viewport.update_from_bounds(RawBounds::new(1280.0, 720.0));
//! if viewport.has_mismatch() {
//!     warn!(reason = ?viewport.mismatch_reason(), "driver ignored requested size");
//! }
//! ```

mod context;
mod mismatch;
mod scope;

pub use context::{ViewportContext, ViewportProviderProps, ViewportSnapshot, ViewportWatcher};
pub use mismatch::{detect_mismatch, Mismatch, DEFAULT_MISMATCH_REASON, MISMATCH_TOLERANCE_PX};
pub use scope::{ViewportScope, MISSING_PROVIDER_MESSAGE};

pub use contracts::{ActualViewport, Dimensions, RawBounds, SessionId, SyncState, ViewportSource};
