//! Command execution logic.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use super::args::{AnalyzeArgs, ConfigArgs};
use crate::config::{AssessmentConfig, CONFIG_FILE_NAME};
use crate::output::{self, OutputMode};
use crate::pipeline::Assessor;
use crate::snapshot::ProjectSnapshot;

/// Execute the analyze command
pub async fn execute_analyze(args: &AnalyzeArgs, output_mode: OutputMode) -> Result<()> {
    let config = load_config(args.config.as_deref()).await?;

    let (snapshot, warnings) = ProjectSnapshot::load(&args.snapshot)
        .await
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            snapshot = %args.snapshot.display(),
            "Snapshot loaded with skipped entries"
        );
    }

    let report = Assessor::new(config).assess(&snapshot);
    output::print_report(&report, output_mode)?;
    Ok(())
}

/// Execute the config command
pub async fn execute_config(args: &ConfigArgs, output_mode: OutputMode) -> Result<()> {
    let config = AssessmentConfig::default();

    let Some(path) = &args.output else {
        match output_mode {
            OutputMode::Json => output::print_json(&config)?,
            OutputMode::Text => output::print_message(config.to_yaml_string()?.trim_end())?,
        }
        return Ok(());
    };

    if !args.force && tokio::fs::try_exists(path).await? {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    config.save(path).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "config_file": path,
        }))?,
        OutputMode::Text => {
            let config = output::OutputConfig::from_env();
            output::print_message(&output::success(
                &format!("Wrote default configuration to {}", path.display()),
                &config,
            ))?;
        }
    }
    Ok(())
}

/// Resolve the configuration for an analyze run.
///
/// An explicit path must exist. Without one, `assay.yaml` in the current
/// directory is used if present.
async fn load_config(explicit: Option<&Path>) -> Result<AssessmentConfig> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = std::env::current_dir()?.join(CONFIG_FILE_NAME);
            if !tokio::fs::try_exists(&candidate).await? {
                tracing::debug!("No configuration file found, using defaults");
                return Ok(AssessmentConfig::default());
            }
            candidate
        }
    };

    let config = AssessmentConfig::load(&path)
        .await
        .with_context(|| format!("Failed to load configuration {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
