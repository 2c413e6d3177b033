//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::{ConfigLoader, SessionBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    session_id: Option<String>,
    api_url: String,
    debounce_ms: u64,
    has_actual_viewport: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    session_id: blueprint.session.id.as_ref().map(ToString::to_string),
                    api_url: blueprint.session.api_url.clone(),
                    debounce_ms: blueprint.viewport.debounce_ms,
                    has_actual_viewport: blueprint.actual_viewport.is_some(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SessionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let viewport = &blueprint.viewport;

    if blueprint.session.id.is_none() {
        warnings.push("No session id configured - every sync will be skipped".to_string());
    }

    if viewport.debounce_ms <= viewport.resize_threshold_ms {
        warnings.push(format!(
            "debounce_ms ({}) is not longer than resize_threshold_ms ({}) - \
             syncs may fire in the middle of a resize",
            viewport.debounce_ms, viewport.resize_threshold_ms
        ));
    }

    if viewport.request_timeout_ms < viewport.debounce_ms {
        warnings.push(format!(
            "request_timeout_ms ({}) is shorter than debounce_ms ({})",
            viewport.request_timeout_ms, viewport.debounce_ms
        ));
    }

    if let Some(actual) = &blueprint.actual_viewport {
        let range = viewport.min_dimension..=viewport.max_dimension;
        if !range.contains(&actual.width) || !range.contains(&actual.height) {
            warnings.push(format!(
                "actual_viewport {} is outside the clamp range {}..={} - \
                 a mismatch will always be reported",
                actual.dimensions(),
                viewport.min_dimension,
                viewport.max_dimension
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!(
                "  Session: {}",
                summary.session_id.as_deref().unwrap_or("(none)")
            );
            println!("  API: {}", summary.api_url);
            println!("  Debounce: {}ms", summary.debounce_ms);
            println!("  Actual viewport known: {}", summary.has_actual_viewport);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ActualViewport;
    use std::io::Write;

    #[test]
    fn test_warnings_for_default_blueprint() {
        let warnings = collect_warnings(&SessionBlueprint::default());
        assert_eq!(warnings.len(), 1, "got: {warnings:?}");
        assert!(warnings[0].contains("No session id"));
    }

    #[test]
    fn test_warning_for_out_of_range_actual_viewport() {
        let mut blueprint = SessionBlueprint::default();
        blueprint.session.id = Some("rec-1".into());
        blueprint.actual_viewport = Some(ActualViewport::new(5120, 2880));

        let warnings = collect_warnings(&blueprint);
        assert_eq!(warnings.len(), 1, "got: {warnings:?}");
        assert!(warnings[0].contains("5120x2880"));
    }

    #[test]
    fn test_validate_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[session]\nid = \"rec-1\"\n[viewport]\ndebounce_ms = 80\n").unwrap();

        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        });

        assert!(result.valid);
        let warnings = result.warnings.unwrap_or_default();
        assert!(warnings.iter().any(|w| w.contains("resize_threshold_ms")));
    }

    #[test]
    fn test_validate_rejects_non_http_api_url() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[session]\nid = \"rec-1\"\napi_url = \"ftp://recorder.example/api\"\n"
        )
        .unwrap();

        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        });

        assert!(!result.valid);
        assert!(result.error.unwrap().contains("must use http or https"));
    }

    #[test]
    fn test_validate_missing_file() {
        let result = validate_config(&ValidateArgs {
            config: "/nonexistent/session.toml".into(),
            json: false,
        });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
