//! Node feature tables and labels.
//!
//! The experiment scripts this crate serves have no real node attributes:
//! features are standard-normal noise and labels are fair coin flips. The
//! generators here reproduce that, seeded, so runs are repeatable.

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xorshift::XorShiftRng;

use crate::{Error, Result};

/// Dense row-major `num_nodes x dim` feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    dim: usize,
    values: Vec<f32>,
}

impl FeatureTable {
    /// All-zero features.
    pub fn zeros(num_nodes: usize, dim: usize) -> Self {
        Self {
            dim,
            values: vec![0.0; num_nodes * dim],
        }
    }

    /// Standard-normal features from a seeded generator.
    pub fn random_normal(num_nodes: usize, dim: usize, seed: u64) -> Self {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let values = (0..num_nodes * dim)
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();
        Self { dim, values }
    }

    /// Build from explicit rows; every row must have the same width.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * dim);
        for (row, r) in rows.iter().enumerate() {
            if r.len() != dim {
                return Err(Error::RaggedFeatures {
                    row,
                    expected: dim,
                    got: r.len(),
                });
            }
            values.extend_from_slice(r);
        }
        Ok(Self { dim, values })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_nodes(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.values.len() / self.dim
        }
    }

    /// Feature vector of one node.
    pub fn row(&self, node: u32) -> Option<&[f32]> {
        let start = node as usize * self.dim;
        self.values.get(start..start + self.dim)
    }

    /// Flat row-major storage.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// Uniform binary labels, one per node.
pub fn random_labels(num_nodes: usize, seed: u64) -> Vec<u8> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    (0..num_nodes).map(|_| rng.gen_range(0..2u8)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_normal_is_seeded() {
        let a = FeatureTable::random_normal(5, 8, 42);
        let b = FeatureTable::random_normal(5, 8, 42);
        let c = FeatureTable::random_normal(5, 8, 43);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.num_nodes(), 5);
        assert_eq!(a.row(4).map(<[f32]>::len), Some(8));
        assert!(a.row(5).is_none());
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = FeatureTable::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, Error::RaggedFeatures { row: 1, expected: 2, got: 1 }));
    }

    #[test]
    fn test_labels_are_binary() {
        let labels = random_labels(100, 7);
        assert_eq!(labels.len(), 100);
        assert!(labels.iter().all(|&l| l <= 1));
        assert!(labels.contains(&0) && labels.contains(&1));
    }
}
