//! Error types for assay operations.
//!
//! The assessment stages themselves never fail: malformed or partial input
//! degrades scores instead of aborting. These errors cover the ambient layer
//! around them (reading snapshots and configuration files).

use std::io;
use thiserror::Error;

/// The error type for assay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot document could not be interpreted at all.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// A specialized Result type for assay operations.
pub type Result<T> = std::result::Result<T, Error>;
