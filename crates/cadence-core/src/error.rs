//! Error types for cadence-core.

use thiserror::Error;

/// Errors raised while reading, splitting or slicing interaction data.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV record.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configured column is absent from the header row.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A non-empty timestamp that matches none of the accepted layouts.
    #[error("unparseable timestamp {value:?} on line {line}")]
    Timestamp { line: usize, value: String },

    /// Test fraction outside (0, 1).
    #[error("invalid test fraction: {0} (expected 0 < f < 1)")]
    InvalidSplit(f64),

    /// Feature rows of unequal width.
    #[error("ragged feature table: row {row} has {got} values, expected {expected}")]
    RaggedFeatures { row: usize, expected: usize, got: usize },

    /// Edge list and timestamp list of different length.
    #[error("misaligned edge batch: {edges} edges, {times} timestamps")]
    MisalignedBatch { edges: usize, times: usize },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
