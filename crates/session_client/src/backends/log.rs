//! LogBackend - logs viewport requests via tracing

use contracts::{ContractError, Dimensions, SessionId, ViewportBackend};
use tracing::{info, instrument};

/// Backend that accepts every request and only logs it
pub struct LogBackend {
    name: String,
}

impl LogBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ViewportBackend for LogBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_backend_push",
        skip(self),
        fields(backend = %self.name)
    )]
    async fn push_viewport(
        &self,
        session_id: &SessionId,
        viewport: Dimensions,
    ) -> Result<(), ContractError> {
        info!(
            backend = %self.name,
            session_id = %session_id,
            width = viewport.width,
            height = viewport.height,
            "Viewport update (not sent)"
        );
        Ok(())
    }
}
