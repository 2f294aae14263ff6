//! Assay CLI binary.

use anyhow::Result;
use assay::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the assay CLI.
///
/// The only I/O is reading one snapshot and one config file, so the
/// current-thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Example: RUST_LOG=assay=debug assay analyze snapshot.json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("assay=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting assay CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Assay CLI completed successfully");
    Ok(())
}
