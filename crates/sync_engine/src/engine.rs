//! Sync Manager implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{
    ContractError, Dimensions, RawBounds, SessionId, SkipReason, SyncOutcome, SyncState,
    ViewportBackend, ViewportSyncConfig,
};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::counters::SyncCounters;
use crate::dimensions::{clamp_dimensions, viewports_equal};

/// Tolerance of the "already synced" short-circuit
const SYNCED_TOLERANCE: u32 = 0;

/// Mutable bookkeeping guarded by one lock
struct Inner {
    session_id: Option<SessionId>,
    /// Bumped on every reset; responses for an older generation are discarded
    generation: u64,
    state: SyncState,
    last_update: Option<Instant>,
    /// Last viewport the backend accepted in this generation
    last_synced: Option<Dimensions>,
    debounce: Option<JoinHandle<()>>,
    /// Sequence of the live debounce task; a fired task holding an older value was superseded
    debounce_seq: u64,
    /// Debounce tasks that fired and are still inside their sync attempt
    debounced_attempts: u32,
    /// Serializes backend requests of one generation
    gate: Arc<AsyncMutex<()>>,
}

impl Inner {
    fn new(session_id: Option<SessionId>) -> Self {
        Self {
            session_id,
            generation: 0,
            state: SyncState::default(),
            last_update: None,
            last_synced: None,
            debounce: None,
            debounce_seq: 0,
            debounced_attempts: 0,
            gate: Arc::new(AsyncMutex::new(())),
        }
    }

    /// Abort the pending debounce task, if it has not fired yet
    fn cancel_debounce(&mut self) -> bool {
        self.debounce_seq += 1;
        match self.debounce.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

struct Shared<B> {
    config: ViewportSyncConfig,
    backend: B,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<SyncState>,
    counters: SyncCounters,
}

impl<B> Shared<B> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push `inner.state` to subscribers if it differs from what they last saw
    fn publish(&self, inner: &Inner) {
        self.state_tx.send_if_modified(|current| {
            if *current == inner.state {
                false
            } else {
                *current = inner.state.clone();
                true
            }
        });
    }

    fn record_skip(&self, reason: SkipReason, trigger: &'static str) {
        self.counters.inc_skipped();
        metrics::counter!(
            "viewport_sync_skipped_total",
            "reason" => reason.as_str(),
            "trigger" => trigger
        )
        .increment(1);
        debug!(reason = reason.as_str(), trigger, "Viewport sync skipped");
    }

    /// Decide whether a request is needed and, if so, mark the state as syncing
    fn begin_request(&self, inner: &mut Inner) -> Result<(SessionId, Dimensions), SkipReason> {
        let session_id = inner.session_id.clone().ok_or(SkipReason::NoSession)?;
        let viewport = inner.state.viewport.ok_or(SkipReason::NoViewport)?;
        if viewports_equal(
            Some(&viewport),
            inner.last_synced.as_ref(),
            SYNCED_TOLERANCE,
        ) {
            return Err(SkipReason::Unchanged);
        }

        inner.state.is_syncing = true;
        inner.state.sync_error = None;
        self.publish(inner);
        Ok((session_id, viewport))
    }

    fn finish_request(
        &self,
        generation: u64,
        session_id: &SessionId,
        viewport: Dimensions,
        result: Result<(), ContractError>,
        elapsed_ms: f64,
    ) -> Result<SyncOutcome, ContractError> {
        let mut inner = self.lock();
        if inner.generation != generation {
            self.counters.inc_stale();
            metrics::counter!("viewport_sync_requests_total", "status" => "stale").increment(1);
            debug!(session_id = %session_id, %viewport, "Discarding response for reset session");
            return Ok(SyncOutcome::Stale);
        }

        inner.state.is_syncing = false;
        metrics::histogram!("viewport_sync_latency_ms").record(elapsed_ms);

        let outcome = match result {
            Ok(()) => {
                inner.last_synced = Some(viewport);
                metrics::counter!("viewport_sync_requests_total", "status" => "success")
                    .increment(1);
                info!(
                    session_id = %session_id,
                    width = viewport.width,
                    height = viewport.height,
                    elapsed_ms,
                    "Viewport synced"
                );
                Ok(SyncOutcome::Synced(viewport))
            }
            Err(e) => {
                self.counters.inc_failures();
                let status = if matches!(e, ContractError::SyncTimeout { .. }) {
                    "timeout"
                } else {
                    "failure"
                };
                metrics::counter!("viewport_sync_requests_total", "status" => status)
                    .increment(1);
                warn!(
                    session_id = %session_id,
                    %viewport,
                    error = %e,
                    "Viewport sync failed"
                );
                inner.state.sync_error = Some(e.to_string());
                Err(e)
            }
        };

        self.publish(&inner);
        outcome
    }
}

impl<B: ViewportBackend + Sync + 'static> Shared<B> {
    async fn on_debounce_elapsed(&self, seq: u64) {
        {
            let mut inner = self.lock();
            if inner.debounce_seq != seq {
                return;
            }
            // From here on the task is a sync attempt, no longer abortable by updates
            inner.debounce = None;
            inner.debounced_attempts += 1;
            inner.state.is_resizing = false;
            self.publish(&inner);
        }

        // Failures are already recorded in the state
        let _ = self.sync_latest("debounce").await;

        let mut inner = self.lock();
        inner.debounced_attempts = inner.debounced_attempts.saturating_sub(1);
    }

    /// One sync attempt for whatever viewport is current when the gate opens
    async fn sync_latest(&self, trigger: &'static str) -> Result<SyncOutcome, ContractError> {
        let (gate, generation) = {
            let inner = self.lock();
            (Arc::clone(&inner.gate), inner.generation)
        };
        let _permit = gate.lock().await;

        let (session_id, viewport) = {
            let mut inner = self.lock();
            if inner.generation != generation {
                self.counters.inc_stale();
                return Ok(SyncOutcome::Stale);
            }
            match self.begin_request(&mut inner) {
                Ok(request) => request,
                Err(reason) => {
                    self.record_skip(reason, trigger);
                    return Ok(SyncOutcome::Skipped(reason));
                }
            }
        };

        self.counters.inc_requests();
        debug!(
            session_id = %session_id,
            %viewport,
            trigger,
            backend = self.backend.name(),
            "Sending viewport to backend"
        );

        let started = Instant::now();
        let result = match tokio::time::timeout(
            self.config.request_timeout(),
            self.backend.push_viewport(&session_id, viewport),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ContractError::SyncTimeout {
                waited_ms: self.config.request_timeout_ms,
            }),
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.finish_request(generation, &session_id, viewport, result, elapsed_ms)
    }
}

/// Owns one session's viewport and its backend synchronization
///
/// `update_from_bounds` updates the local viewport immediately and schedules
/// a debounced sync of the latest value. `force_sync` skips the wait. At most
/// one backend request is in flight at a time, and a request is only issued
/// when the viewport differs from the last one the backend accepted.
///
/// Dropping the manager cancels the pending debounce and discards any
/// response still in flight.
pub struct SyncManager<B> {
    shared: Arc<Shared<B>>,
}

impl<B: ViewportBackend + Sync + 'static> SyncManager<B> {
    /// Create a manager for `session_id`. No timer runs until the first update.
    pub fn new(config: ViewportSyncConfig, session_id: Option<SessionId>, backend: B) -> Self {
        let (state_tx, _) = watch::channel(SyncState::default());
        Self {
            shared: Arc::new(Shared {
                config,
                backend,
                inner: Mutex::new(Inner::new(session_id)),
                state_tx,
                counters: SyncCounters::new(),
            }),
        }
    }

    pub fn config(&self) -> &ViewportSyncConfig {
        &self.shared.config
    }

    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    pub fn counters(&self) -> &SyncCounters {
        &self.shared.counters
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.shared.lock().session_id.clone()
    }

    /// Current state, always reflecting the most recent call
    pub fn state(&self) -> SyncState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn viewport(&self) -> Option<Dimensions> {
        self.shared.state_tx.borrow().viewport
    }

    /// Receiver notified once per actual state change
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.shared.state_tx.subscribe()
    }

    /// Whether a debounced sync is armed or has fired and not finished yet
    pub fn has_pending_sync(&self) -> bool {
        let inner = self.shared.lock();
        inner.debounce.is_some() || inner.debounced_attempts > 0
    }

    /// Clamp `raw` with this manager's bounds without touching state
    pub fn clamped_viewport(&self, raw: RawBounds) -> Dimensions {
        clamp_dimensions(
            raw,
            self.shared.config.min_dimension,
            self.shared.config.max_dimension,
        )
    }

    /// Accept a container size sample.
    ///
    /// The clamped viewport is visible through [`state`](Self::state) as soon
    /// as this returns. The backend sees only the value current when the
    /// debounce window elapses. Never blocks on the network.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn update_from_bounds(&self, raw: RawBounds) -> Dimensions {
        let viewport = self.clamped_viewport(raw);
        let now = Instant::now();
        let threshold = self.shared.config.resize_threshold();

        let mut inner = self.shared.lock();
        inner.state.viewport = Some(viewport);

        let in_burst = inner
            .last_update
            .is_some_and(|previous| now.duration_since(previous) < threshold);
        if in_burst && !inner.state.is_resizing {
            inner.state.is_resizing = true;
            self.shared.counters.inc_bursts();
            metrics::counter!("viewport_resize_bursts_total").increment(1);
        }
        inner.last_update = Some(now);

        self.schedule_debounce(&mut inner);
        self.shared.counters.inc_updates();
        metrics::counter!("viewport_updates_total").increment(1);
        self.shared.publish(&inner);

        debug!(
            width = viewport.width,
            height = viewport.height,
            raw_width = raw.width,
            raw_height = raw.height,
            resizing = inner.state.is_resizing,
            "Viewport updated from bounds"
        );
        viewport
    }

    fn schedule_debounce(&self, inner: &mut Inner) {
        inner.cancel_debounce();
        let seq = inner.debounce_seq;
        let delay = self.shared.config.debounce();
        let shared = Arc::clone(&self.shared);
        inner.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.on_debounce_elapsed(seq).await;
        }));
    }

    /// Cancel the pending debounce and sync the current viewport now.
    ///
    /// Waits for any request already in flight, then issues at most one more.
    ///
    /// # Errors
    /// The backend failure or timeout; the same message lands in `sync_error`.
    #[instrument(name = "sync_manager_force_sync", skip(self))]
    pub async fn force_sync(&self) -> Result<SyncOutcome, ContractError> {
        {
            let mut inner = self.shared.lock();
            if inner.cancel_debounce() {
                // The cancelled timer would have ended the burst
                inner.state.is_resizing = false;
                self.shared.publish(&inner);
            }
        }
        self.shared.sync_latest("force").await
    }

    /// Back to the uninitialized state: no viewport, no flags, no error,
    /// nothing pending, nothing remembered as synced.
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        self.reset_locked(&mut inner);
    }

    fn reset_locked(&self, inner: &mut Inner) {
        inner.cancel_debounce();
        inner.generation += 1;
        inner.gate = Arc::new(AsyncMutex::new(()));
        inner.state = SyncState::default();
        inner.last_update = None;
        inner.last_synced = None;
        self.shared.publish(inner);
        debug!(generation = inner.generation, "Sync manager reset");
    }

    /// Switch to another session. A different id resets all viewport state.
    pub fn set_session_id(&self, session_id: Option<SessionId>) {
        let mut inner = self.shared.lock();
        if inner.session_id == session_id {
            return;
        }
        info!(
            from = ?inner.session_id,
            to = ?session_id,
            "Session changed, resetting viewport state"
        );
        self.reset_locked(&mut inner);
        inner.session_id = session_id;
    }
}

impl<B> Drop for SyncManager<B> {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        inner.cancel_debounce();
        inner.generation += 1;
    }
}
