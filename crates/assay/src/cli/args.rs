//! CLI argument structs for all commands.

use clap::Parser;
use std::path::PathBuf;

/// Arguments for the `analyze` command
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Snapshot file (JSON) describing components, evaluations and history
    pub snapshot: PathBuf,

    /// Configuration file (YAML)
    ///
    /// Defaults to `assay.yaml` in the current directory when present,
    /// otherwise the built-in weighting tables are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `config` command
#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    /// Write the configuration to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it already exists
    #[arg(short, long, requires = "output")]
    pub force: bool,
}
