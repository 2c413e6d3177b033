//! `run` command implementation.

use anyhow::{Context, Result};
use config_loader::{ConfigLoader, SessionBlueprint};
use session_client::create_backend;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use viewport_context::{ViewportContext, ViewportProviderProps};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::replay::{parse_samples, replay, ReplayConfig};

/// Execute the `run` command
pub async fn run_replay(args: &RunArgs) -> Result<()> {
    let blueprint = load_blueprint(args)?;

    info!(
        session_id = ?blueprint.session.id,
        api_url = %blueprint.session.api_url,
        backend = ?args.backend,
        debounce_ms = blueprint.viewport.debounce_ms,
        "Configuration loaded"
    );
    if blueprint.session.id.is_none() {
        warn!("No session id configured - every sync will be skipped");
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let samples = parse_samples(&read_samples(args).await?)?;

    let backend = create_backend(
        args.backend.into(),
        &blueprint.session,
        blueprint.viewport.request_timeout(),
    )
    .context("Failed to create viewport backend")?;
    let context = ViewportContext::new(ViewportProviderProps::from_blueprint(&blueprint), backend);

    let config = ReplayConfig {
        samples,
        force_sync: args.force_sync,
    };

    tokio::select! {
        stats = replay(&context, config) => {
            info!(
                samples = stats.counters.updates,
                requests = stats.counters.requests,
                failures = stats.counters.failures,
                duration_secs = stats.duration.as_secs_f64(),
                "Replay completed"
            );

            if args.json {
                println!("{}", stats.to_json().context("Failed to serialize replay report")?);
            } else {
                stats.print_summary();
            }
        }
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping replay...");
        }
    }

    Ok(())
}

/// Load configuration, apply CLI overrides, validate the result
fn load_blueprint(args: &RunArgs) -> Result<SessionBlueprint> {
    let mut blueprint = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using defaults");
            SessionBlueprint::default()
        }
    };

    if let Some(ref session_id) = args.session_id {
        info!(session_id = %session_id, "Overriding session id from CLI");
        blueprint.session.id = Some(session_id.as_str().into());
    }
    if let Some(ref api_url) = args.api_url {
        info!(api_url = %api_url, "Overriding API URL from CLI");
        blueprint.session.api_url = api_url.clone();
    }

    ConfigLoader::validate(&blueprint).context("Invalid configuration after CLI overrides")?;
    Ok(blueprint)
}

async fn read_samples(args: &RunArgs) -> Result<String> {
    if args.samples.as_os_str() == "-" {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .map_err(CliError::from)?;
        return Ok(content);
    }

    tokio::fs::read_to_string(&args.samples)
        .await
        .with_context(|| format!("Failed to read samples from {}", args.samples.display()))
}

/// Resolves on Ctrl+C or SIGTERM; never resolves if the handlers cannot be installed
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
