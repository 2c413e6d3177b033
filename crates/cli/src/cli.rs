//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use observability::ObservabilityConfig;
use session_client::BackendKind;
use std::path::PathBuf;

/// Viewport Sync - keep a recording session's browser viewport in step with its container
#[derive(Parser, Debug)]
#[command(
    name = "viewport-sync",
    author,
    version,
    about = "Viewport synchronization for live recording sessions",
    long_about = "Replays container size samples through the viewport sync manager.\n\n\
                  Samples are clamped, debounced and pushed to the recording API \n\
                  (or a log/mock backend), and the resulting viewport state is reported."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "VIEWPORT_SYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "VIEWPORT_SYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay size samples against a session
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "VIEWPORT_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the session id from configuration
    #[arg(long, env = "VIEWPORT_SYNC_SESSION_ID")]
    pub session_id: Option<String>,

    /// Override the recording API base URL from configuration
    #[arg(long, env = "VIEWPORT_SYNC_API_URL")]
    pub api_url: Option<String>,

    /// Backend receiving viewport updates
    #[arg(long, value_enum, default_value = "http", env = "VIEWPORT_SYNC_BACKEND")]
    pub backend: BackendArg,

    /// Sample file, one `WxH[@delay_ms]` or JSON object per line ("-" = stdin)
    #[arg(short, long, default_value = "-")]
    pub samples: PathBuf,

    /// Force a sync after the last sample instead of waiting for the debounce
    #[arg(long)]
    pub force_sync: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    pub json: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "VIEWPORT_SYNC_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "session.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "session.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the resolved configuration as TOML
    #[arg(long, conflicts_with = "json")]
    pub toml: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Backend selection on the command line
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendArg {
    /// POST to the recording API
    #[default]
    Http,
    /// Log requests only
    Log,
    /// Record requests in memory
    Mock,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

impl Cli {
    /// Logging setup for this invocation; `run --metrics-port` installs the exporter itself
    pub fn observability_config(&self) -> ObservabilityConfig {
        let level = match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        ObservabilityConfig {
            log_format: self.log_format.clone().into(),
            metrics_port: None,
            default_log_level: level.to_string(),
            pin_log_level: self.quiet,
        }
    }
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Run(_) => "run",
            Self::Validate(_) => "validate",
            Self::Info(_) => "info",
        }
    }
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Http => BackendKind::Http,
            BackendArg::Log => BackendKind::Log,
            BackendArg::Mock => BackendKind::Mock,
        }
    }
}
