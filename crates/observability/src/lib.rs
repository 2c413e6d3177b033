//! # Observability
//!
//! 视口同步的可观测性：Tracing 日志 + Prometheus 指标。
//!
//! ## 指标
//!
//! 同步引擎与上下文内联上报：
//! - `viewport_updates_total` / `viewport_resize_bursts_total`: 尺寸更新与突发调整
//! - `viewport_sync_requests_total{status}` / `viewport_sync_latency_ms`: 后端请求结果与延迟
//! - `viewport_mismatch`: 浏览器视口与驱动实际视口是否一致 (0/1)
//!
//! 调用方通过 [`metrics`] 模块补充：
//! - `viewport_sync_attempts_total{outcome}` / `viewport_sync_attempt_latency_ms`
//! - `viewport_synced_width` / `viewport_synced_height`
//! - `viewport_samples_total` / `viewport_browser_width` / `viewport_browser_height`
//! - `viewport_mismatch_observed_total`
//!
//! ## 使用示例
//!
//! ```ignore
//! observability::init()?;
//!
//! let started = Instant::now();
//! let result = context.force_sync().await;
//! observability::record_sync_result(&result, started.elapsed());
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_mismatch, record_sync_result, record_viewport_sample, MetricsSummary, RunningStats,
    StatsSummary, SyncStatsAggregator,
};

/// 以默认配置初始化：JSON 日志 + 0.0.0.0:9000 上的视口同步指标
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus 端口 (None = 禁用)
    pub metrics_port: Option<u16>,
    /// RUST_LOG 未设置时的日志级别
    pub default_log_level: String,
    /// 忽略 RUST_LOG，始终使用 `default_log_level`
    pub pin_log_level: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: Some(9000),
            default_log_level: "info".to_string(),
            pin_log_level: false,
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志 (含线程与源码位置)
    #[default]
    Json,
    Pretty,
    Compact,
}

impl ObservabilityConfig {
    fn env_filter(&self) -> EnvFilter {
        if self.pin_log_level {
            return EnvFilter::new(&self.default_log_level);
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_log_level))
    }
}

/// 使用自定义配置初始化
///
/// 同一进程只能成功一次；再次调用返回错误。
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        install_exporter(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// 仅安装 Prometheus 导出器（Tracing 已由调用方初始化）
pub fn init_metrics_only(port: u16) -> Result<()> {
    install_exporter(port)
}

fn install_exporter(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port, "Viewport sync metrics endpoint listening");
    Ok(())
}
