//! Error types for cadence-nn.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Candle tensor error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// An edge names a node with no feature row.
    #[error("node {index} out of range for {len} feature rows")]
    NodeOutOfRange { index: u32, len: usize },

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Training error.
    #[error("training error: {0}")]
    Training(String),

    /// Graph data error.
    #[error("graph error: {0}")]
    Graph(#[from] cadence_core::Error),

    /// Evaluation error.
    #[error("evaluation error: {0}")]
    Eval(#[from] cadence_eval::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
