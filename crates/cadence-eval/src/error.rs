//! Error types for cadence-eval.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Parallel score arrays of different length.
    #[error("length mismatch: {labels} labels, {scores} scores, {predictions} predictions")]
    LengthMismatch {
        labels: usize,
        scores: usize,
        predictions: usize,
    },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
