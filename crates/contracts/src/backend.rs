//! ViewportBackend trait - outbound viewport sync interface
//!
//! The backend reconfigures the browser and its screencast pipeline; here it
//! is only a single call taking a size and returning success or failure.

use crate::{ContractError, Dimensions, SessionId};

/// Backend accepting viewport updates for a live session
///
/// All backend implementations must implement this trait.
#[trait_variant::make(ViewportBackend: Send)]
pub trait LocalViewportBackend {
    /// Backend name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Ask the driver of `session_id` to use `viewport`
    ///
    /// # Errors
    /// Returns a backend error carrying the failure message
    async fn push_viewport(
        &self,
        session_id: &SessionId,
        viewport: Dimensions,
    ) -> Result<(), ContractError>;
}
