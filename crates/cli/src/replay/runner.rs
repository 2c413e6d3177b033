//! Replay runner - feeds samples into a context and waits for the sync to settle.

use std::time::Duration;

use contracts::ViewportBackend;
use observability::{record_mismatch, record_sync_result, record_viewport_sample, SyncStatsAggregator};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};
use viewport_context::ViewportContext;

use super::{ReplayStats, Sample};

/// Extra allowance on top of debounce and request timeout when settling
const SETTLE_MARGIN: Duration = Duration::from_millis(50);

/// Poll interval while waiting for a pending sync
const SETTLE_POLL: Duration = Duration::from_millis(25);

/// Replay configuration
#[derive(Debug, Clone, Default)]
pub struct ReplayConfig {
    pub samples: Vec<Sample>,

    /// Force a sync after the last sample instead of waiting for the debounce
    pub force_sync: bool,
}

/// Replay `config.samples` into `context`
pub async fn replay<B>(context: &ViewportContext<B>, config: ReplayConfig) -> ReplayStats
where
    B: ViewportBackend + Sync + 'static,
{
    let started = Instant::now();
    let mut sync = SyncStatsAggregator::new();

    info!(samples = config.samples.len(), "Replaying size samples");

    for sample in &config.samples {
        if sample.delay_ms > 0 {
            sleep(sample.delay()).await;
        }

        let dims = context.update_from_bounds(sample.bounds());
        record_viewport_sample(dims);
        sync.observe_sample(dims);

        let has_mismatch = context.has_mismatch();
        record_mismatch(has_mismatch);
        sync.observe_mismatch(has_mismatch);

        debug!(viewport = %dims, has_mismatch, "Sample applied");
    }

    if config.force_sync {
        let attempt = Instant::now();
        let result = context.force_sync().await;
        let latency = attempt.elapsed();

        match &result {
            Ok(outcome) => info!(%outcome, "Forced sync finished"),
            Err(e) => warn!(error = %e, "Forced sync failed"),
        }
        record_sync_result(&result, latency);
        sync.update(&result, latency);
    } else {
        settle(context).await;
    }

    ReplayStats {
        duration: started.elapsed(),
        sync,
        counters: context.sync_manager().counters().snapshot(),
        snapshot: context.snapshot(),
    }
}

/// Wait until no debounced sync is pending and no request is in flight
async fn settle<B>(context: &ViewportContext<B>)
where
    B: ViewportBackend + Sync + 'static,
{
    let manager = context.sync_manager();
    let config = manager.config();
    let deadline = Instant::now() + config.debounce() + config.request_timeout() + SETTLE_MARGIN;
    let mut watcher = context.watch();

    while manager.has_pending_sync() || manager.state().is_syncing {
        if Instant::now() >= deadline {
            warn!("Sync did not settle before the deadline");
            return;
        }
        // Skipped syncs publish nothing, so fall back to polling
        let _ = timeout(SETTLE_POLL, watcher.changed()).await;
    }
}
