//! ViewportContext - requested and actual viewport of one session

use contracts::{
    ActualViewport, ContractError, Dimensions, RawBounds, SessionBlueprint, SessionId,
    SyncOutcome, SyncState, ViewportBackend, ViewportSyncConfig,
};
use serde::Serialize;
use sync_engine::SyncManager;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::mismatch::{detect_mismatch, Mismatch};

/// Construction parameters of a [`ViewportContext`]
#[derive(Debug, Clone, Default)]
pub struct ViewportProviderProps {
    /// Fixed for the context's lifetime; a new session needs a new context
    pub session_id: Option<SessionId>,

    /// Driver viewport known at mount time, e.g. from session creation
    pub actual_viewport: Option<ActualViewport>,

    pub config: ViewportSyncConfig,
}

impl ViewportProviderProps {
    pub fn from_blueprint(blueprint: &SessionBlueprint) -> Self {
        Self {
            session_id: blueprint.session.id.clone(),
            actual_viewport: blueprint.actual_viewport.clone(),
            config: blueprint.viewport.clone(),
        }
    }
}

/// Everything a consumer can read, computed at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewportSnapshot {
    pub session_id: Option<SessionId>,
    /// Viewport requested from the driver
    pub browser_viewport: Option<Dimensions>,
    /// Viewport the driver reports using
    pub actual_viewport: Option<ActualViewport>,
    pub sync_state: SyncState,
    pub has_mismatch: bool,
    pub mismatch_reason: Option<String>,
}

impl ViewportSnapshot {
    fn compute(
        session_id: Option<SessionId>,
        sync_state: SyncState,
        actual_viewport: Option<ActualViewport>,
    ) -> Self {
        let Mismatch {
            has_mismatch,
            reason,
        } = detect_mismatch(sync_state.viewport.as_ref(), actual_viewport.as_ref());
        Self {
            session_id,
            browser_viewport: sync_state.viewport,
            actual_viewport,
            sync_state,
            has_mismatch,
            mismatch_reason: reason,
        }
    }
}

/// Facade over one session's [`SyncManager`] plus the driver-reported viewport
pub struct ViewportContext<B> {
    session_id: Option<SessionId>,
    manager: SyncManager<B>,
    actual_tx: watch::Sender<Option<ActualViewport>>,
}

impl<B: ViewportBackend + Sync + 'static> ViewportContext<B> {
    pub fn new(props: ViewportProviderProps, backend: B) -> Self {
        let manager = SyncManager::new(props.config, props.session_id.clone(), backend);
        let (actual_tx, _) = watch::channel(props.actual_viewport);
        Self {
            session_id: props.session_id,
            manager,
            actual_tx,
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// The underlying manager, for counters and configuration
    pub fn sync_manager(&self) -> &SyncManager<B> {
        &self.manager
    }

    pub fn browser_viewport(&self) -> Option<Dimensions> {
        self.manager.viewport()
    }

    pub fn actual_viewport(&self) -> Option<ActualViewport> {
        self.actual_tx.borrow().clone()
    }

    pub fn sync_state(&self) -> SyncState {
        self.manager.state()
    }

    pub fn mismatch(&self) -> Mismatch {
        let browser = self.manager.viewport();
        detect_mismatch(browser.as_ref(), self.actual_tx.borrow().as_ref())
    }

    pub fn has_mismatch(&self) -> bool {
        self.mismatch().has_mismatch
    }

    pub fn mismatch_reason(&self) -> Option<String> {
        self.mismatch().reason
    }

    pub fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot::compute(
            self.session_id.clone(),
            self.manager.state(),
            self.actual_viewport(),
        )
    }

    /// See [`SyncManager::update_from_bounds`]
    pub fn update_from_bounds(&self, raw: RawBounds) -> Dimensions {
        let viewport = self.manager.update_from_bounds(raw);
        self.record_mismatch_gauge();
        viewport
    }

    /// See [`SyncManager::force_sync`]
    pub async fn force_sync(&self) -> Result<SyncOutcome, ContractError> {
        self.manager.force_sync().await
    }

    pub fn clamped_viewport(&self, raw: RawBounds) -> Dimensions {
        self.manager.clamped_viewport(raw)
    }

    /// Replace the driver-reported viewport wholesale
    #[instrument(name = "viewport_context_set_actual", skip(self))]
    pub fn set_actual_viewport(&self, actual: Option<ActualViewport>) {
        self.actual_tx.send_if_modified(|current| {
            if *current == actual {
                false
            } else {
                *current = actual;
                true
            }
        });

        let mismatch = self.mismatch();
        if mismatch.has_mismatch {
            warn!(
                session_id = ?self.session_id,
                requested = ?self.manager.viewport(),
                reason = mismatch.reason.as_deref().unwrap_or_default(),
                "Driver viewport differs from requested viewport"
            );
        } else {
            debug!(session_id = ?self.session_id, "Actual viewport updated");
        }
        self.record_mismatch_gauge();
    }

    /// Reset the local resize history.
    ///
    /// The actual viewport is kept: it belongs to the session profile, not to
    /// local resizing.
    pub fn reset(&self) {
        self.manager.reset();
        self.record_mismatch_gauge();
    }

    /// Watch for changes of either the sync state or the actual viewport
    pub fn watch(&self) -> ViewportWatcher {
        ViewportWatcher {
            session_id: self.session_id.clone(),
            sync_rx: self.manager.subscribe(),
            actual_rx: self.actual_tx.subscribe(),
        }
    }

    fn record_mismatch_gauge(&self) {
        let value = if self.has_mismatch() { 1.0 } else { 0.0 };
        metrics::gauge!("viewport_mismatch").set(value);
    }
}

/// Change feed of a [`ViewportContext`]
pub struct ViewportWatcher {
    session_id: Option<SessionId>,
    sync_rx: watch::Receiver<SyncState>,
    actual_rx: watch::Receiver<Option<ActualViewport>>,
}

impl ViewportWatcher {
    pub fn current(&self) -> ViewportSnapshot {
        ViewportSnapshot::compute(
            self.session_id.clone(),
            self.sync_rx.borrow().clone(),
            self.actual_rx.borrow().clone(),
        )
    }

    /// Wait for the next change and return the resulting snapshot.
    ///
    /// Returns `None` once the context has been dropped.
    pub async fn changed(&mut self) -> Option<ViewportSnapshot> {
        let result = tokio::select! {
            result = self.sync_rx.changed() => result,
            result = self.actual_rx.changed() => result,
        };
        result.ok()?;

        self.sync_rx.borrow_and_update();
        self.actual_rx.borrow_and_update();
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ViewportSource;
    use session_client::MockBackend;
    use std::time::Duration;
    use tokio::time::sleep;

    fn props(actual: Option<ActualViewport>) -> ViewportProviderProps {
        ViewportProviderProps {
            session_id: Some("rec-1".into()),
            actual_viewport: actual,
            config: ViewportSyncConfig::default(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatch_with_driver_reason() {
        let actual = ActualViewport::new(1920, 1080)
            .with_source(ViewportSource::Fingerprint)
            .with_reason("Browser profile specifies 1920x1080");
        let context = ViewportContext::new(props(Some(actual)), MockBackend::new());

        assert!(!context.has_mismatch(), "no browser viewport yet");

        context.update_from_bounds(RawBounds::new(1280.0, 720.0));

        assert!(context.has_mismatch());
        assert_eq!(
            context.mismatch_reason().as_deref(),
            Some("Browser profile specifies 1920x1080")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatch_fallback_reason() {
        let context = ViewportContext::new(
            props(Some(ActualViewport::new(1920, 1080))),
            MockBackend::new(),
        );

        context.update_from_bounds(RawBounds::new(1280.0, 720.0));

        assert!(context.has_mismatch());
        assert_eq!(
            context.mismatch_reason().as_deref(),
            Some("Session profile has viewport override configured")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_matching_actual_viewport() {
        let context = ViewportContext::new(
            props(Some(ActualViewport::new(1280, 720))),
            MockBackend::new(),
        );

        context.update_from_bounds(RawBounds::new(1283.0, 718.0));

        let snapshot = context.snapshot();
        assert!(!snapshot.has_mismatch);
        assert_eq!(snapshot.mismatch_reason, None);
        assert_eq!(snapshot.browser_viewport, Some(Dimensions::new(1283, 718)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_actual_viewport_replaces_value() {
        let context = ViewportContext::new(props(None), MockBackend::new());
        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        assert!(!context.has_mismatch());

        context.set_actual_viewport(Some(ActualViewport::new(1366, 768)));
        assert!(context.has_mismatch());

        context.set_actual_viewport(None);
        assert!(!context.has_mismatch());
        assert_eq!(context.actual_viewport(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_keeps_actual_viewport() {
        let actual = ActualViewport::new(1920, 1080);
        let context = ViewportContext::new(props(Some(actual.clone())), MockBackend::new());
        context.update_from_bounds(RawBounds::new(1280.0, 720.0));

        context.reset();

        assert_eq!(context.browser_viewport(), None);
        assert_eq!(context.actual_viewport(), Some(actual));
        assert!(!context.has_mismatch());
        assert_eq!(context.sync_state(), SyncState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_delegate_to_manager() {
        let backend = MockBackend::new();
        let context = ViewportContext::new(props(None), backend.clone());

        assert_eq!(
            context.clamped_viewport(RawBounds::new(100.0, 9000.0)),
            Dimensions::new(320, 3840)
        );
        assert_eq!(context.browser_viewport(), None, "clamping does not mutate");

        context.update_from_bounds(RawBounds::new(1024.0, 768.0));
        let outcome = context.force_sync().await.unwrap();

        assert_eq!(outcome, SyncOutcome::Synced(Dimensions::new(1024, 768)));
        assert_eq!(backend.request_count(), 1);
        assert_eq!(context.session_id(), Some(&SessionId::from("rec-1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_sees_browser_viewport() {
        let context = ViewportContext::new(props(None), MockBackend::new());
        let mut watcher = context.watch();

        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        let snapshot = watcher.changed().await.unwrap();

        assert_eq!(snapshot.browser_viewport, Some(Dimensions::new(1280, 720)));
        assert!(!snapshot.has_mismatch);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_sees_actual_viewport() {
        let context = ViewportContext::new(props(None), MockBackend::new());
        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        sleep(Duration::from_millis(500)).await;

        let mut watcher = context.watch();
        context.set_actual_viewport(Some(ActualViewport::new(1920, 1080)));
        let snapshot = watcher.changed().await.unwrap();

        assert!(snapshot.has_mismatch);
        assert_eq!(
            snapshot.actual_viewport.as_ref().map(|a| a.dimensions()),
            Some(Dimensions::new(1920, 1080))
        );
        assert_eq!(watcher.current(), snapshot);
    }

    #[tokio::test]
    async fn test_watcher_ends_with_context() {
        let context = ViewportContext::new(props(None), MockBackend::new());
        let mut watcher = context.watch();
        drop(context);
        assert!(watcher.changed().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_serializes() {
        let context = ViewportContext::new(
            props(Some(ActualViewport::new(1920, 1080))),
            MockBackend::new(),
        );
        context.update_from_bounds(RawBounds::new(1280.0, 720.0));

        let json = serde_json::to_value(context.snapshot()).unwrap();
        assert_eq!(json["session_id"], "rec-1");
        assert_eq!(json["browser_viewport"]["width"], 1280);
        assert_eq!(json["has_mismatch"], true);
    }
}
