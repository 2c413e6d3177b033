//! # Viewport Sync CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 会话配置加载与验证
//! - 尺寸采样回放与同步结果汇总
//! - 优雅关闭处理

mod cli;
mod commands;
mod error;
mod replay;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_replay, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    observability::init_with_config(cli.observability_config())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = cli.command.name(),
        "Viewport Sync CLI starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_replay(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
