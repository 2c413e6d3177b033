//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> 上下文 -> 后端的端到端场景 (Mock 后端, 暂停时钟)
//! - 上下文同步结果 -> 统计聚合
//! - 真实 HTTP 往返 (本地 axum 服务)

#[cfg(test)]
mod contract_tests {
    use contracts::{ContractError, SyncState, ViewportSyncConfig};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_sync_state_snapshot() {
        let json = serde_json::to_value(SyncState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "viewport": null,
                "is_resizing": false,
                "is_syncing": false,
                "sync_error": null
            })
        );
    }

    #[test]
    fn test_error_messages_are_stable() {
        let timeout = ContractError::SyncTimeout { waited_ms: 10_000 };
        assert_eq!(timeout.to_string(), "viewport sync timed out after 10000ms");

        let config = ViewportSyncConfig::default();
        assert_eq!(config.request_timeout_ms, 10_000);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ActualViewport, ContractError, Dimensions, RawBounds, SessionId, SkipReason, SyncOutcome,
        SyncState, ViewportSyncConfig,
    };
    use observability::{record_sync_result, SyncStatsAggregator};
    use session_client::MockBackend;
    use sync_engine::SyncManager;
    use tokio::time::{sleep, Instant};
    use viewport_context::{ViewportContext, ViewportProviderProps};

    /// Longer than the default debounce plus an instant mock response
    const SETTLE: Duration = Duration::from_millis(300);

    fn context_for(
        session_id: Option<&str>,
        actual: Option<ActualViewport>,
        backend: MockBackend,
    ) -> ViewportContext<MockBackend> {
        let props = ViewportProviderProps {
            session_id: session_id.map(SessionId::from),
            actual_viewport: actual,
            config: ViewportSyncConfig::default(),
        };
        ViewportContext::new(props, backend)
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_burst() {
        let backend = MockBackend::new();
        let context = context_for(Some("rec-1"), None, backend.clone());

        context.update_from_bounds(RawBounds::new(1000.0, 700.0));
        sleep(Duration::from_millis(30)).await;
        context.update_from_bounds(RawBounds::new(1100.0, 700.0));
        sleep(Duration::from_millis(30)).await;
        context.update_from_bounds(RawBounds::new(1280.4, 719.6));

        assert_eq!(context.browser_viewport(), Some(Dimensions::new(1280, 720)));
        assert_eq!(backend.request_count(), 0);

        sleep(SETTLE).await;

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].session_id, "rec-1");
        assert_eq!(requests[0].viewport, Dimensions::new(1280, 720));
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_resync_is_skipped() {
        let backend = MockBackend::new();
        let context = context_for(Some("rec-1"), None, backend.clone());

        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        sleep(SETTLE).await;
        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        sleep(SETTLE).await;

        assert_eq!(backend.request_count(), 1);
        assert_eq!(context.sync_manager().counters().skipped(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_returning_to_start_sends_nothing() {
        let backend = MockBackend::new();
        let context = context_for(Some("rec-1"), None, backend.clone());

        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        sleep(SETTLE).await;

        context.update_from_bounds(RawBounds::new(1300.0, 720.0));
        sleep(Duration::from_millis(20)).await;
        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        sleep(SETTLE).await;

        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_flag_settles() {
        let context = context_for(Some("rec-1"), None, MockBackend::new());

        context.update_from_bounds(RawBounds::new(800.0, 600.0));
        sleep(Duration::from_millis(10)).await;
        context.update_from_bounds(RawBounds::new(820.0, 600.0));
        assert!(context.sync_state().is_resizing);

        sleep(SETTLE).await;
        assert!(!context.sync_state().is_resizing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_change_resets_state() {
        let backend = MockBackend::new();
        backend.fail_with("recorder unavailable");
        let manager = SyncManager::new(
            ViewportSyncConfig::default(),
            Some("rec-1".into()),
            backend.clone(),
        );

        manager.update_from_bounds(RawBounds::new(1024.0, 768.0));
        sleep(SETTLE).await;
        assert_eq!(
            manager.state().sync_error.as_deref(),
            Some("viewport sync request failed: recorder unavailable")
        );

        manager.update_from_bounds(RawBounds::new(1025.0, 768.0));
        sleep(Duration::from_millis(10)).await;
        manager.update_from_bounds(RawBounds::new(1030.0, 768.0));
        assert!(manager.has_pending_sync());

        manager.set_session_id(Some("rec-2".into()));

        assert_eq!(manager.state(), SyncState::default());
        assert!(!manager.has_pending_sync());

        sleep(SETTLE).await;
        assert_eq!(backend.request_count(), 1, "cancelled debounce never fires");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_session_never_calls_backend() {
        let backend = MockBackend::new();
        let context = context_for(None, None, backend.clone());

        for width in [800.0, 900.0, 1000.0] {
            context.update_from_bounds(RawBounds::new(width, 600.0));
            sleep(Duration::from_millis(20)).await;
        }
        sleep(SETTLE).await;

        assert_eq!(backend.request_count(), 0);
        assert_eq!(context.sync_state().sync_error, None);
        assert_eq!(
            context.force_sync().await.unwrap(),
            SyncOutcome::Skipped(SkipReason::NoSession)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatch_from_loaded_config() {
        let content = r#"
[session]
id = "rec-1"

[actual_viewport]
width = 1920
height = 1080
source = "fingerprint"
reason = "Browser profile specifies 1920x1080"
"#;
        let blueprint = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        let context = ViewportContext::new(
            ViewportProviderProps::from_blueprint(&blueprint),
            MockBackend::new(),
        );

        context.update_from_bounds(RawBounds::new(1280.0, 720.0));

        assert!(context.has_mismatch());
        assert_eq!(
            context.mismatch_reason().as_deref(),
            Some("Browser profile specifies 1920x1080")
        );

        context.set_actual_viewport(Some(ActualViewport::new(1920, 1080)));
        assert_eq!(
            context.mismatch_reason().as_deref(),
            Some("Session profile has viewport override configured")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_in_flight_response() {
        let backend = MockBackend::new();
        backend.set_delay(Duration::from_millis(200));
        let context = context_for(Some("rec-1"), None, backend.clone());

        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        sleep(Duration::from_millis(160)).await;
        assert!(context.sync_state().is_syncing);

        context.reset();
        sleep(SETTLE).await;

        assert_eq!(context.sync_state(), SyncState::default());
        assert_eq!(context.sync_manager().counters().stale(), 1);

        // Nothing was remembered as synced, so the same viewport goes out again
        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        sleep(Duration::from_millis(600)).await;
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_then_forced_retry() {
        let backend = MockBackend::new();
        backend.fail_with("503 from recorder");
        let context = context_for(Some("rec-1"), None, backend.clone());

        context.update_from_bounds(RawBounds::new(1366.0, 768.0));
        sleep(SETTLE).await;
        assert!(context.sync_state().sync_error.is_some());
        assert_eq!(context.browser_viewport(), Some(Dimensions::new(1366, 768)));

        backend.succeed();
        let outcome = context.force_sync().await.unwrap();

        assert_eq!(outcome, SyncOutcome::Synced(Dimensions::new(1366, 768)));
        assert_eq!(context.sync_state().sync_error, None);
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_aggregate_context_outcomes() {
        let backend = MockBackend::new();
        backend.fail_with("503 from recorder");
        let context = context_for(
            Some("rec-1"),
            Some(ActualViewport::new(1366, 768)),
            backend.clone(),
        );
        let mut stats = SyncStatsAggregator::new();

        context.update_from_bounds(RawBounds::new(1366.0, 768.0));
        stats.observe_sample(Dimensions::new(1366, 768));
        stats.observe_mismatch(context.has_mismatch());

        let started = Instant::now();
        let result = context.force_sync().await;
        record_sync_result(&result, started.elapsed());
        stats.update(&result, started.elapsed());

        backend.succeed();
        for _ in 0..2 {
            let started = Instant::now();
            let result = context.force_sync().await;
            record_sync_result(&result, started.elapsed());
            stats.update(&result, started.elapsed());
        }

        let summary = stats.summary();
        assert_eq!(summary.total_samples, 1);
        assert_eq!(summary.total_attempts, 3);
        assert_eq!(summary.synced, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.mismatches, 0);
        assert_eq!(summary.skipped.get("unchanged"), Some(&1));
        assert_eq!(summary.latency_ms.count, 2);
        assert!((summary.failure_rate - 50.0).abs() < f64::EPSILON);
        assert!(summary
            .last_error
            .as_deref()
            .is_some_and(|e| e.contains("503 from recorder")));
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_backend_times_out() {
        let backend = MockBackend::new();
        backend.set_delay(Duration::from_secs(60));
        let props = ViewportProviderProps {
            session_id: Some("rec-1".into()),
            actual_viewport: None,
            config: ViewportSyncConfig {
                request_timeout_ms: 100,
                ..Default::default()
            },
        };
        let context = ViewportContext::new(props, backend);

        context.update_from_bounds(RawBounds::new(1280.0, 720.0));
        let err = context.force_sync().await.unwrap_err();

        assert!(matches!(err, ContractError::SyncTimeout { waited_ms: 100 }));
        let state = context.sync_state();
        assert!(!state.is_syncing);
        assert_eq!(
            state.sync_error.as_deref(),
            Some("viewport sync timed out after 100ms")
        );
    }
}

#[cfg(test)]
mod http_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{Path, State};
    use axum::routing::post;
    use axum::{Json, Router};
    use contracts::{Dimensions, RawBounds, SessionConfig, SyncOutcome};
    use serde_json::Value;
    use session_client::{create_backend, BackendKind};
    use viewport_context::{ViewportContext, ViewportProviderProps};

    type Received = Arc<Mutex<Vec<(String, Value)>>>;

    async fn record(
        State(received): State<Received>,
        Path(session_id): Path<String>,
        Json(body): Json<Value>,
    ) {
        received.lock().unwrap().push((session_id, body));
    }

    async fn spawn_recorder() -> (String, Received) {
        let received: Received = Arc::default();
        let app = Router::new()
            .route("/api/recordings/live/:session_id/viewport", post(record))
            .with_state(Arc::clone(&received));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/api"), received)
    }

    #[tokio::test]
    async fn test_context_posts_to_recorder() {
        let (api_url, received) = spawn_recorder().await;
        let session = SessionConfig {
            id: Some("rec 7".into()),
            api_url,
        };
        let backend = create_backend(BackendKind::Http, &session, Duration::from_secs(5)).unwrap();
        let props = ViewportProviderProps {
            session_id: session.id.clone(),
            ..Default::default()
        };
        let context = ViewportContext::new(props, backend);

        context.update_from_bounds(RawBounds::new(1280.2, 719.9));
        let outcome = context.force_sync().await.unwrap();

        assert_eq!(outcome, SyncOutcome::Synced(Dimensions::new(1280, 720)));
        let received = received.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "rec 7");
        assert_eq!(received[0].1, serde_json::json!({"width": 1280, "height": 720}));
    }
}
