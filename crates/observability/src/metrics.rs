//! 视口同步指标收集模块
//!
//! 基于每次同步尝试的结果收集和统计运行指标。
//! Sync Manager 自身也会上报计数器, 这里负责调用方视角的统计。

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::{ContractError, Dimensions, SyncOutcome};
use metrics::{counter, gauge, histogram};

fn outcome_label(result: &Result<SyncOutcome, ContractError>) -> &'static str {
    match result {
        Ok(SyncOutcome::Synced(_)) => "synced",
        Ok(SyncOutcome::Skipped(reason)) => reason.as_str(),
        Ok(SyncOutcome::Stale) => "stale",
        Err(ContractError::SyncTimeout { .. }) => "timeout",
        Err(_) => "failure",
    }
}

/// 记录一次同步尝试的结果
///
/// # Example
///
/// ```ignore
/// let started = Instant::now();
/// let result = context.force_sync().await;
/// record_sync_result(&result, started.elapsed());
/// ```
pub fn record_sync_result(result: &Result<SyncOutcome, ContractError>, latency: Duration) {
    counter!("viewport_sync_attempts_total", "outcome" => outcome_label(result)).increment(1);

    // 只有真正发出请求的结果才计入延迟
    if !matches!(result, Ok(SyncOutcome::Skipped(_))) {
        histogram!("viewport_sync_attempt_latency_ms").record(latency.as_secs_f64() * 1000.0);
    }

    if let Ok(SyncOutcome::Synced(dims)) = result {
        gauge!("viewport_synced_width").set(f64::from(dims.width));
        gauge!("viewport_synced_height").set(f64::from(dims.height));
    }
}

/// 记录一次尺寸采样 (钳制之后)
pub fn record_viewport_sample(dims: Dimensions) {
    counter!("viewport_samples_total").increment(1);
    gauge!("viewport_browser_width").set(f64::from(dims.width));
    gauge!("viewport_browser_height").set(f64::from(dims.height));
}

/// 记录请求视口与实际视口是否一致
pub fn record_mismatch(has_mismatch: bool) {
    if has_mismatch {
        counter!("viewport_mismatch_observed_total").increment(1);
    }
}

/// 同步指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct SyncStatsAggregator {
    /// 尺寸采样数
    pub total_samples: u64,

    /// 同步尝试总数
    pub total_attempts: u64,

    /// 成功次数
    pub synced: u64,

    /// 失败次数 (含超时)
    pub failed: u64,

    /// 会话重置导致丢弃的响应
    pub stale: u64,

    /// 检测到不一致的次数
    pub mismatches: u64,

    /// 跳过原因计数
    pub skipped: BTreeMap<&'static str, u64>,

    /// 失败原因 (最近一次)
    pub last_error: Option<String>,

    /// 请求延迟统计 (毫秒)
    pub latency_stats: RunningStats,

    /// 采样宽度统计
    pub width_stats: RunningStats,

    /// 采样高度统计
    pub height_stats: RunningStats,
}

impl SyncStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 统计一次尺寸采样
    pub fn observe_sample(&mut self, dims: Dimensions) {
        self.total_samples += 1;
        self.width_stats.push(f64::from(dims.width));
        self.height_stats.push(f64::from(dims.height));
    }

    /// 统计一次不一致检测
    pub fn observe_mismatch(&mut self, has_mismatch: bool) {
        if has_mismatch {
            self.mismatches += 1;
        }
    }

    /// 统计一次同步尝试
    pub fn update(&mut self, result: &Result<SyncOutcome, ContractError>, latency: Duration) {
        self.total_attempts += 1;
        match result {
            Ok(SyncOutcome::Synced(_)) => self.synced += 1,
            Ok(SyncOutcome::Skipped(reason)) => {
                *self.skipped.entry(reason.as_str()).or_insert(0) += 1;
                return;
            }
            Ok(SyncOutcome::Stale) => self.stale += 1,
            Err(e) => {
                self.failed += 1;
                self.last_error = Some(e.to_string());
            }
        }
        self.latency_stats.push(latency.as_secs_f64() * 1000.0);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let requests = self.synced + self.failed + self.stale;
        MetricsSummary {
            total_samples: self.total_samples,
            total_attempts: self.total_attempts,
            synced: self.synced,
            failed: self.failed,
            stale: self.stale,
            mismatches: self.mismatches,
            failure_rate: if requests > 0 {
                self.failed as f64 / requests as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            width: StatsSummary::from(&self.width_stats),
            height: StatsSummary::from(&self.height_stats),
            skipped: self.skipped.clone(),
            last_error: self.last_error.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_samples: u64,
    pub total_attempts: u64,
    pub synced: u64,
    pub failed: u64,
    pub stale: u64,
    pub mismatches: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
    pub width: StatsSummary,
    pub height: StatsSummary,
    pub skipped: BTreeMap<&'static str, u64>,
    pub last_error: Option<String>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Viewport Sync Summary ===")?;
        writeln!(f, "Samples: {}", self.total_samples)?;
        writeln!(f, "Sync attempts: {}", self.total_attempts)?;
        writeln!(f, "Synced: {}", self.synced)?;
        writeln!(
            f,
            "Failed: {} ({:.2}%)",
            self.failed, self.failure_rate
        )?;
        writeln!(f, "Stale: {}", self.stale)?;
        writeln!(f, "Mismatches observed: {}", self.mismatches)?;
        writeln!(f, "Request latency (ms): {}", self.latency_ms)?;
        writeln!(f, "Sample width: {}", self.width)?;
        writeln!(f, "Sample height: {}", self.height)?;

        if !self.skipped.is_empty() {
            writeln!(f, "Skipped:")?;
            for (reason, count) in &self.skipped {
                writeln!(f, "  {}: {}", reason, count)?;
            }
        }
        if let Some(error) = &self.last_error {
            writeln!(f, "Last error: {error}")?;
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
