//! Error types for Meshbench.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Meshbench operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Meshbench.
#[derive(Error, Debug)]
pub enum Error {
    // Dataset errors
    #[error("results file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // Chart rendering errors
    #[error("chart rendering failed for {name}: {reason}")]
    Chart { name: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // General errors
    #[error("internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build a chart error from any plotters backend failure.
    pub fn chart(name: &str, err: impl std::fmt::Display) -> Self {
        Self::Chart {
            name: name.to_string(),
            reason: err.to_string(),
        }
    }
}
