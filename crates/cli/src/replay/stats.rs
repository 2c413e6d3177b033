//! Replay statistics.

use std::time::Duration;

use observability::SyncStatsAggregator;
use serde::Serialize;
use sync_engine::CountersSnapshot;
use viewport_context::ViewportSnapshot;

/// Statistics from a replay run
#[derive(Debug, Clone)]
pub struct ReplayStats {
    /// Total duration of the replay, including the final settle
    pub duration: Duration,

    /// Caller-side statistics (samples, forced syncs, mismatches)
    pub sync: SyncStatsAggregator,

    /// Sync Manager counters, covering debounced syncs too
    pub counters: CountersSnapshot,

    /// Context state after the last sample settled
    pub snapshot: ViewportSnapshot,
}

/// JSON shape of a replay report
#[derive(Serialize)]
struct ReplayReport<'a> {
    duration_ms: u128,
    samples: u64,
    bursts: u64,
    requests: u64,
    failures: u64,
    skipped: u64,
    stale: u64,
    snapshot: &'a ViewportSnapshot,
}

impl ReplayStats {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ReplayReport {
            duration_ms: self.duration.as_millis(),
            samples: self.counters.updates,
            bursts: self.counters.bursts,
            requests: self.counters.requests,
            failures: self.counters.failures,
            skipped: self.counters.skipped,
            stale: self.counters.stale,
            snapshot: &self.snapshot,
        })
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Viewport Sync Replay                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        let snapshot = &self.snapshot;
        let show = |dims: Option<String>| dims.unwrap_or_else(|| "-".to_string());

        println!("📐 Viewport");
        println!(
            "   ├─ Session: {}",
            show(snapshot.session_id.as_ref().map(ToString::to_string))
        );
        println!(
            "   ├─ Browser: {}",
            show(snapshot.browser_viewport.map(|d| d.to_string()))
        );
        println!(
            "   ├─ Actual: {}",
            show(
                snapshot
                    .actual_viewport
                    .as_ref()
                    .map(|a| a.dimensions().to_string())
            )
        );
        match &snapshot.mismatch_reason {
            Some(reason) => println!("   └─ Mismatch: {reason}"),
            None => println!("   └─ Mismatch: none"),
        }

        println!("\n🔄 Sync Manager");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Samples: {}", self.counters.updates);
        println!("   ├─ Resize bursts: {}", self.counters.bursts);
        println!("   ├─ Requests: {}", self.counters.requests);
        println!("   ├─ Failures: {}", self.counters.failures);
        println!("   ├─ Skipped: {}", self.counters.skipped);
        println!("   └─ Stale: {}", self.counters.stale);

        if let Some(error) = &snapshot.sync_state.sync_error {
            println!("\n⚠️  Last sync error: {error}");
        }

        println!("\n{}", self.sync.summary());
    }
}
