//! Error types for pollinet-dedup

use thiserror::Error;

/// Result type alias for dedup operations
pub type Result<T> = std::result::Result<T, DedupError>;

/// Main error type for dedup operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DedupError {
    /// A taxon label with no tokens at all
    #[error("Malformed taxon label: {0:?}")]
    MalformedLabel(String),

    /// A network with an empty axis cannot be compared
    #[error("Degenerate network: {rows} rows x {cols} columns")]
    DegenerateNetwork { rows: usize, cols: usize },

    /// Table construction errors
    #[error("Invalid table: {0}")]
    InvalidTable(#[from] TableError),

    /// A network name already present in the corpus
    #[error("Duplicate network name: {0}")]
    DuplicateNetworkName(String),

    /// Configuration errors
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Errors raised while building a `NetworkTable`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Duplicate {axis} label: {label}")]
    DuplicateLabel { axis: Axis, label: String },

    #[error("Empty {axis} label at position {position}")]
    EmptyLabel { axis: Axis, position: usize },

    #[error("Invalid interaction value {value} at ({row}, {col})")]
    InvalidValue { row: String, col: String, value: f64 },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One side of a network table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Row => write!(f, "row"),
            Self::Column => write!(f, "column"),
        }
    }
}

/// A finished node mapping that breaks totality, consistency or injectivity.
///
/// This is a logic defect in the matcher, not a runtime condition: it is only
/// ever used to format the panic raised when verification fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingInvariantViolation {
    #[error("label {0:?} has no entry in the mapping")]
    MissingKey(String),

    #[error("{from:?} maps to {to:?} but {to:?} maps back to {back:?}")]
    Inconsistent {
        from: String,
        to: String,
        back: Option<String>,
    },

    #[error("{target:?} is the image of both {first:?} and {second:?}")]
    NotInjective {
        target: String,
        first: String,
        second: String,
    },
}
