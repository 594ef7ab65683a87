#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

//! Ranking and classification metrics for interaction-graph models.
//!
//! Models emit a [`ScoreBatch`]: for every evaluated node or edge, the true
//! label, the predicted positive-class probability and the thresholded
//! prediction. [`EvaluationReport::from_batch`] reduces it to the numbers the
//! experiments report.
//!
//! # Standard Metrics
//!
//! | Metric | Range | Description |
//! |--------|-------|-------------|
//! | Accuracy | [0, 1] | Fraction of correct predictions |
//! | Precision / Recall / F1 | [0, 1] | Macro average over classes 0 and 1 |
//! | MRR | [0, 1] | Mean of `1/rank` over positive items, ranked by score |
//! | NDCG@k | [0, 1] | Discounted gain of the top `k` by score, over the ideal |
//!
//! # Example
//!
//! ```rust
//! use cadence_eval::{EvaluationReport, ScoreBatch};
//!
//! let batch = ScoreBatch::from_parts(vec![1, 0, 0], vec![0.9, 0.5, 0.1], vec![1, 1, 0])?;
//! let report = EvaluationReport::from_batch(&batch, 10);
//!
//! assert_eq!(report.mrr, 1.0);
//! assert_eq!(report.ndcg, 1.0);
//! # Ok::<(), cadence_eval::Error>(())
//! ```

mod error;
pub mod metrics;
mod report;

pub use error::{Error, Result};
pub use metrics::{
    accuracy, class_scores, macro_scores, mrr, mrr_with, ndcg_at_k, rank_of, ClassScores,
    MacroScores, RankPolicy,
};
pub use report::{EvaluationReport, ScoreBatch};
