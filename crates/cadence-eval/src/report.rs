//! Score batches and the evaluation report built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metrics::{accuracy, macro_scores, mrr_with, ndcg_at_k, RankPolicy};
use crate::{Error, Result};

/// Parallel arrays of ground truth, positive-class probability and
/// thresholded prediction, one entry per evaluated node or edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BatchParts")]
pub struct ScoreBatch {
    labels: Vec<u8>,
    scores: Vec<f64>,
    predictions: Vec<u8>,
}

/// Unchecked wire form; lengths are validated on the way in.
#[derive(Deserialize)]
struct BatchParts {
    labels: Vec<u8>,
    scores: Vec<f64>,
    predictions: Vec<u8>,
}

impl TryFrom<BatchParts> for ScoreBatch {
    type Error = Error;

    fn try_from(parts: BatchParts) -> Result<Self> {
        Self::from_parts(parts.labels, parts.scores, parts.predictions)
    }
}

impl ScoreBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            labels: Vec::with_capacity(n),
            scores: Vec::with_capacity(n),
            predictions: Vec::with_capacity(n),
        }
    }

    /// Assemble from already-collected arrays, which must have equal length.
    pub fn from_parts(labels: Vec<u8>, scores: Vec<f64>, predictions: Vec<u8>) -> Result<Self> {
        if labels.len() != scores.len() || labels.len() != predictions.len() {
            return Err(Error::LengthMismatch {
                labels: labels.len(),
                scores: scores.len(),
                predictions: predictions.len(),
            });
        }
        Ok(Self {
            labels,
            scores,
            predictions,
        })
    }

    /// Append one evaluated item.
    pub fn push(&mut self, label: u8, score: f64, prediction: u8) {
        self.labels.push(label);
        self.scores.push(score);
        self.predictions.push(prediction);
    }

    /// Append every item of another batch.
    pub fn extend(&mut self, other: &ScoreBatch) {
        self.labels.extend_from_slice(&other.labels);
        self.scores.extend_from_slice(&other.scores);
        self.predictions.extend_from_slice(&other.predictions);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn predictions(&self) -> &[u8] {
        &self.predictions
    }
}

/// Final metrics of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    /// Macro precision over classes 0 and 1.
    pub precision: f64,
    /// Macro recall over classes 0 and 1.
    pub recall: f64,
    /// Macro F1 over classes 0 and 1.
    pub f1: f64,
    pub mrr: f64,
    pub ndcg: f64,
    /// Cut-off used for `ndcg`.
    pub ndcg_k: usize,
    /// Number of evaluated items.
    pub num_samples: usize,
}

impl EvaluationReport {
    /// Compute every metric with strict MRR ranking.
    pub fn from_batch(batch: &ScoreBatch, k: usize) -> Self {
        Self::from_batch_with(batch, k, RankPolicy::Strict)
    }

    /// Compute every metric; an empty batch gives the all-zero report.
    pub fn from_batch_with(batch: &ScoreBatch, k: usize, policy: RankPolicy) -> Self {
        if batch.is_empty() {
            return Self {
                ndcg_k: k,
                ..Self::default()
            };
        }
        let macro_avg = macro_scores(&batch.labels, &batch.predictions);
        Self {
            accuracy: accuracy(&batch.labels, &batch.predictions),
            precision: macro_avg.precision,
            recall: macro_avg.recall,
            f1: macro_avg.f1,
            mrr: mrr_with(&batch.labels, &batch.scores, policy),
            ndcg: ndcg_at_k(&batch.labels, &batch.scores, k),
            ndcg_k: k,
            num_samples: batch.len(),
        }
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        format!(
            "NDCG@{}: {:.4} | Precision: {:.4} | Recall: {:.4} | F1: {:.4} | MRR: {:.4} | Accuracy: {:.4} (n={})",
            self.ndcg_k,
            self.ndcg,
            self.precision,
            self.recall,
            self.f1,
            self.mrr,
            self.accuracy,
            self.num_samples
        )
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_checks_lengths() {
        let err = ScoreBatch::from_parts(vec![0, 1], vec![0.2], vec![0, 1]).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                labels: 2,
                scores: 1,
                predictions: 2
            }
        ));
    }

    #[test]
    fn test_empty_batch_is_all_zero() {
        let report = EvaluationReport::from_batch(&ScoreBatch::new(), 10);

        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.f1, 0.0);
        assert_eq!(report.mrr, 0.0);
        assert_eq!(report.ndcg, 0.0);
        assert_eq!(report.num_samples, 0);
        assert_eq!(report.ndcg_k, 10);
    }

    #[test]
    fn test_report_perfect_classifier() {
        let mut batch = ScoreBatch::new();
        batch.push(1, 0.9, 1);
        batch.push(0, 0.2, 0);
        batch.push(0, 0.1, 0);

        let report = EvaluationReport::from_batch(&batch, 10);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.f1, 1.0);
        assert_eq!(report.mrr, 1.0);
        assert_eq!(report.ndcg, 1.0);
        assert_eq!(report.num_samples, 3);
    }

    #[test]
    fn test_extend_concatenates() {
        let mut a = ScoreBatch::new();
        a.push(1, 0.7, 1);
        let mut b = ScoreBatch::new();
        b.push(0, 0.4, 0);
        a.extend(&b);

        assert_eq!(a.labels(), &[1, 0]);
        assert_eq!(a.scores(), &[0.7, 0.4]);
        assert_eq!(a.predictions(), &[1, 0]);
    }

    #[test]
    fn test_summary_format() {
        let report = EvaluationReport {
            accuracy: 0.5,
            precision: 0.25,
            recall: 0.75,
            f1: 0.375,
            mrr: 1.0,
            ndcg: 0.125,
            ndcg_k: 10,
            num_samples: 4,
        };
        assert_eq!(
            report.summary(),
            "NDCG@10: 0.1250 | Precision: 0.2500 | Recall: 0.7500 | F1: 0.3750 | MRR: 1.0000 | Accuracy: 0.5000 (n=4)"
        );
    }

    #[test]
    fn test_summary_mentions_every_metric() {
        let s = EvaluationReport::default().summary();
        for key in ["NDCG@0", "Precision", "Recall", "F1", "MRR", "Accuracy"] {
            assert!(s.contains(key), "{s} lacks {key}");
        }
    }
}
