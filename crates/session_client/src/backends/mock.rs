//! MockBackend - records requests, optionally failing or slow

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use contracts::{ContractError, Dimensions, SessionId, ViewportBackend};
use tracing::debug;

/// One request received by a [`MockBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportRequest {
    pub session_id: SessionId,
    pub viewport: Dimensions,
}

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<ViewportRequest>,
    fail_with: Option<String>,
    delay: Duration,
}

/// In-memory backend
///
/// Clones share the same request log, so a test can keep one clone and hand
/// the other to a Sync Manager.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail every following request with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        self.lock().fail_with = Some(message.into());
    }

    /// Accept every following request
    pub fn succeed(&self) {
        self.lock().fail_with = None;
    }

    /// Delay each response by `delay`
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = delay;
    }

    pub fn requests(&self) -> Vec<ViewportRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn last_request(&self) -> Option<ViewportRequest> {
        self.lock().requests.last().cloned()
    }
}

impl ViewportBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn push_viewport(
        &self,
        session_id: &SessionId,
        viewport: Dimensions,
    ) -> Result<(), ContractError> {
        let delay = {
            let mut state = self.lock();
            state.requests.push(ViewportRequest {
                session_id: session_id.clone(),
                viewport,
            });
            state.delay
        };
        debug!(session_id = %session_id, %viewport, "Mock backend received viewport");

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.lock().fail_with.clone() {
            Some(message) => Err(ContractError::backend_request(message)),
            None => Ok(()),
        }
    }
}
