//! Backend selection from configuration

use std::time::Duration;

use contracts::{ContractError, Dimensions, SessionConfig, SessionId, ViewportBackend};
use tracing::{info, instrument};

use crate::backends::{HttpBackend, LogBackend, MockBackend};
use crate::error::SessionClientError;

/// Which backend a session talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// The recording API over HTTP
    #[default]
    Http,
    /// Log requests, send nothing
    Log,
    /// Record requests in memory
    Mock,
}

/// Any of the built-in backends behind one type
pub enum AnyBackend {
    Http(HttpBackend),
    Log(LogBackend),
    Mock(MockBackend),
}

impl ViewportBackend for AnyBackend {
    fn name(&self) -> &str {
        match self {
            Self::Http(backend) => backend.name(),
            Self::Log(backend) => backend.name(),
            Self::Mock(backend) => backend.name(),
        }
    }

    async fn push_viewport(
        &self,
        session_id: &SessionId,
        viewport: Dimensions,
    ) -> Result<(), ContractError> {
        match self {
            Self::Http(backend) => backend.push_viewport(session_id, viewport).await,
            Self::Log(backend) => backend.push_viewport(session_id, viewport).await,
            Self::Mock(backend) => backend.push_viewport(session_id, viewport).await,
        }
    }
}

/// Build the backend of `kind` for `session`
#[instrument(name = "session_client_create_backend", skip(session))]
pub fn create_backend(
    kind: BackendKind,
    session: &SessionConfig,
    request_timeout: Duration,
) -> Result<AnyBackend, SessionClientError> {
    let backend = match kind {
        BackendKind::Http => {
            AnyBackend::Http(HttpBackend::new("http", &session.api_url, request_timeout)?)
        }
        BackendKind::Log => AnyBackend::Log(LogBackend::new("log")),
        BackendKind::Mock => AnyBackend::Mock(MockBackend::new()),
    };
    info!(backend = backend.name(), api_url = %session.api_url, "Backend created");
    Ok(backend)
}
