//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `analyze`: Assess a project snapshot
//! - `config`: Print or write the default configuration
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! assay config --output assay.yaml
//! assay analyze snapshot.json
//! assay --json analyze snapshot.json --config assay.yaml
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{AnalyzeArgs, ConfigArgs};

/// Assay - dependency, completion and priority assessment
///
/// Reads a snapshot of a multi-component project and reports dependency
/// health, weighted completion and a ranked list of what to work on next.
#[derive(Parser, Debug)]
#[command(name = "assay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Assess a project snapshot
    ///
    /// Runs dependency analysis, completion scoring and priority ranking over
    /// the snapshot and prints a digest (or the full report with `--json`).
    Analyze(AnalyzeArgs),

    /// Print or write the default configuration
    ///
    /// The YAML written here holds every weighting table and threshold and
    /// can be edited and passed back with `analyze --config`.
    Config(ConfigArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns a clap error if the arguments are invalid.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if input files cannot be read or output cannot be
    /// written.
    pub async fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Analyze(args)) => execute::execute_analyze(args, output_mode).await,
            Some(Commands::Config(args)) => execute::execute_config(args, output_mode).await,
            None => {
                println!("Assay project assessment");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["assay"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["assay", "analyze", "snapshot.json"]).unwrap();
        match cli.command {
            Some(Commands::Analyze(args)) => {
                assert_eq!(args.snapshot, PathBuf::from("snapshot.json"));
                assert!(args.config.is_none());
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_parse_analyze_with_config_and_json() {
        let cli = Cli::try_parse_from([
            "assay",
            "analyze",
            "snapshot.json",
            "--config",
            "custom.yaml",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Analyze(args)) => {
                assert_eq!(args.config, Some(PathBuf::from("custom.yaml")));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_parse_analyze_requires_snapshot() {
        assert!(Cli::try_parse_from(["assay", "analyze"]).is_err());
    }

    #[test]
    fn test_parse_config_default() {
        let cli = Cli::try_parse_from(["assay", "config"]).unwrap();
        match cli.command {
            Some(Commands::Config(args)) => {
                assert!(args.output.is_none());
                assert!(!args.force);
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_parse_config_output_force() {
        let cli = Cli::try_parse_from(["assay", "config", "-o", "assay.yaml", "--force"]).unwrap();
        match cli.command {
            Some(Commands::Config(args)) => {
                assert_eq!(args.output, Some(PathBuf::from("assay.yaml")));
                assert!(args.force);
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_parse_force_requires_output() {
        assert!(Cli::try_parse_from(["assay", "config", "--force"]).is_err());
    }
}
