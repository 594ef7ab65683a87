//! Classification and ranking metrics over flat prediction arrays.
//!
//! All functions are pure: the same inputs give bit-identical outputs.
//! Degenerate inputs never divide by zero; they resolve to `0.0`.
//!
//! | Metric | Inputs | Degenerate case |
//! |--------|--------|-----------------|
//! | [`accuracy`] | labels, predictions | empty -> 0 |
//! | [`macro_scores`] | labels, predictions | empty denominator -> 0 for that class |
//! | [`mrr`] | labels, scores | no positives -> 0 |
//! | [`ndcg_at_k`] | labels, scores, k | IDCG = 0 -> 0 |
//!
//! Labels and predictions are binary (`0` or `1`); scores are the
//! positive-class probability.

use serde::{Deserialize, Serialize};

/// Fraction of positions where the prediction equals the label.
pub fn accuracy(labels: &[u8], predictions: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(l, p)| l == p)
        .count();
    correct as f64 / labels.len() as f64
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// One-vs-rest precision/recall/F1 treating `class` as positive.
pub fn class_scores(labels: &[u8], predictions: &[u8], class: u8) -> ClassScores {
    let mut tp = 0;
    let mut predicted = 0;
    let mut actual = 0;
    for (&l, &p) in labels.iter().zip(predictions) {
        if p == class {
            predicted += 1;
        }
        if l == class {
            actual += 1;
            if p == class {
                tp += 1;
            }
        }
    }

    let precision = ratio(tp, predicted);
    let recall = ratio(tp, actual);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassScores {
        precision,
        recall,
        f1,
    }
}

/// Unweighted mean over classes 0 and 1, plus the per-class breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub per_class: [ClassScores; 2],
}

/// Macro-averaged precision, recall and F1 over both binary classes.
///
/// Both classes always take part in the average, whether or not they occur.
pub fn macro_scores(labels: &[u8], predictions: &[u8]) -> MacroScores {
    let per_class = [
        class_scores(labels, predictions, 0),
        class_scores(labels, predictions, 1),
    ];
    let mean = |f: fn(&ClassScores) -> f64| per_class.iter().map(f).sum::<f64>() / 2.0;
    MacroScores {
        precision: mean(|c| c.precision),
        recall: mean(|c| c.recall),
        f1: mean(|c| c.f1),
        per_class,
    }
}

/// How tied scores contribute to a rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankPolicy {
    /// `1 + #{j : s_j > s_i}`; ties never push an item down.
    #[default]
    Strict,
    /// Mean position within the tie group: `#{s_j > s_i} + (#{s_j == s_i} + 1) / 2`,
    /// where the tie count includes the item itself.
    Average,
}

/// Rank of `target` among `scores` (which include `target` itself).
pub fn rank_of(target: f64, scores: &[f64], policy: RankPolicy) -> f64 {
    let better = scores.iter().filter(|&&s| s > target).count();
    match policy {
        RankPolicy::Strict => (better + 1) as f64,
        RankPolicy::Average => {
            let tied = scores.iter().filter(|&&s| s == target).count();
            better as f64 + (tied as f64 + 1.0) / 2.0
        }
    }
}

/// Mean Reciprocal Rank of the positive positions, strict ranking.
pub fn mrr(labels: &[u8], scores: &[f64]) -> f64 {
    mrr_with(labels, scores, RankPolicy::Strict)
}

/// Mean Reciprocal Rank with an explicit tie policy.
///
/// Every position with label `1` is ranked against all scores; the result is
/// the mean of `1 / rank`, or `0.0` when there is no positive.
pub fn mrr_with(labels: &[u8], scores: &[f64], policy: RankPolicy) -> f64 {
    let reciprocal: Vec<f64> = labels
        .iter()
        .zip(scores)
        .filter(|(l, _)| **l == 1)
        .map(|(_, &s)| 1.0 / rank_of(s, scores, policy))
        .collect();

    if reciprocal.is_empty() {
        0.0
    } else {
        reciprocal.iter().sum::<f64>() / reciprocal.len() as f64
    }
}

fn gain(label: u8) -> f64 {
    f64::from(label).exp2() - 1.0
}

fn discount(position: usize) -> f64 {
    (position as f64 + 2.0).log2()
}

/// Normalized Discounted Cumulative Gain over the top `k` positions.
///
/// Positions are ordered by descending score; equal scores keep input order.
/// The ideal ordering sorts all labels descending and is cut at the same `k`.
pub fn ndcg_at_k(labels: &[u8], scores: &[f64], k: usize) -> f64 {
    let n = labels.len().min(scores.len());
    let window = k.min(n);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let dcg: f64 = order
        .iter()
        .take(window)
        .enumerate()
        .map(|(pos, &i)| gain(labels[i]) / discount(pos))
        .sum();

    let mut ideal: Vec<u8> = labels[..n].to_vec();
    ideal.sort_unstable_by(|a, b| b.cmp(a));
    let idcg: f64 = ideal
        .iter()
        .take(window)
        .enumerate()
        .map(|(pos, &l)| gain(l) / discount(pos))
        .sum();

    if idcg > 0.0 {
        dcg / idcg
    } else {
        0.0
    }
}
