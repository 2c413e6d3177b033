//! `info` command implementation.

use anyhow::{Context, Result};
use config_loader::{ConfigLoader, SessionBlueprint};
use contracts::ActualViewport;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo<'a> {
    version: String,
    session: SessionInfo,
    viewport: ViewportInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual_viewport: Option<&'a ActualViewport>,
}

#[derive(Serialize)]
struct SessionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    api_url: String,
    /// Endpoint viewport updates are posted to
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
}

#[derive(Serialize)]
struct ViewportInfo {
    min_dimension: u32,
    max_dimension: u32,
    resize_threshold_ms: u64,
    debounce_ms: u64,
    request_timeout_ms: u64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&build_config_info(&blueprint))
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else if args.toml {
        println!("{}", ConfigLoader::to_toml(&blueprint)?);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn endpoint(blueprint: &SessionBlueprint) -> Option<String> {
    let id = blueprint.session.id.as_ref()?;
    Some(format!(
        "{}/recordings/live/{}/viewport",
        blueprint.session.api_url.trim_end_matches('/'),
        id
    ))
}

fn build_config_info(blueprint: &SessionBlueprint) -> ConfigInfo<'_> {
    let viewport = &blueprint.viewport;
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        session: SessionInfo {
            id: blueprint.session.id.as_ref().map(ToString::to_string),
            api_url: blueprint.session.api_url.clone(),
            endpoint: endpoint(blueprint),
        },
        viewport: ViewportInfo {
            min_dimension: viewport.min_dimension,
            max_dimension: viewport.max_dimension,
            resize_threshold_ms: viewport.resize_threshold_ms,
            debounce_ms: viewport.debounce_ms,
            request_timeout_ms: viewport.request_timeout_ms,
        },
        actual_viewport: blueprint.actual_viewport.as_ref(),
    }
}

fn print_config_info(blueprint: &SessionBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Viewport Sync Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let session = &blueprint.session;
    println!("🎥 Session");
    println!("   ├─ Version: {:?}", blueprint.version);
    match &session.id {
        Some(id) => println!("   ├─ Id: {}", id),
        None => println!("   ├─ Id: (none, syncs are skipped)"),
    }
    println!("   ├─ API: {}", session.api_url);
    match endpoint(blueprint) {
        Some(endpoint) => println!("   └─ Endpoint: POST {}", endpoint),
        None => println!("   └─ Endpoint: -"),
    }

    let viewport = &blueprint.viewport;
    println!("\n⚙️  Sync Settings");
    println!(
        "   ├─ Clamp range: {}..={} px",
        viewport.min_dimension, viewport.max_dimension
    );
    println!("   ├─ Resize threshold: {}ms", viewport.resize_threshold_ms);
    println!("   ├─ Debounce: {}ms", viewport.debounce_ms);
    println!("   └─ Request timeout: {}ms", viewport.request_timeout_ms);

    if let Some(actual) = &blueprint.actual_viewport {
        println!("\n🖥  Actual Viewport");
        println!("   ├─ Size: {}", actual.dimensions());
        match &actual.source {
            Some(source) => println!("   ├─ Source: {}", source),
            None => println!("   ├─ Source: unknown"),
        }
        println!(
            "   └─ Reason: {}",
            actual.non_empty_reason().unwrap_or("-")
        );
    }

    println!();
}
