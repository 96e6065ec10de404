//! Error types for fieldrecon

use thiserror::Error;

/// Main error type for fieldrecon operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid field dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Index out of bounds: ({row}, {col}) in field of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Field size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid configuration: {name} = {value} ({reason})")]
    InvalidConfiguration {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Observation set is empty")]
    EmptyObservationSet,

    #[error("Observation ({row}, {col}) lies outside the target grid ({rows}, {cols})")]
    OutOfBoundsCoordinate {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for fieldrecon operations
pub type Result<T> = std::result::Result<T, Error>;
