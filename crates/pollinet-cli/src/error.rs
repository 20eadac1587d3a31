//! Error types for the command-line driver

use std::path::PathBuf;

use pollinet_dedup::{ConfigError, DedupError};
use thiserror::Error;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: cannot parse {value:?} at ({row}, {col}) as a number")]
    Value {
        path: PathBuf,
        row: String,
        col: String,
        value: String,
    },

    #[error("{path}: {source}")]
    Network {
        path: PathBuf,
        #[source]
        source: DedupError,
    },

    #[error("Dedup error: {0}")]
    Dedup(#[from] DedupError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
