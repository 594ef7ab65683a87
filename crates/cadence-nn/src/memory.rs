//! Per-node memory table.

use candle_core::{Device, Tensor};

use crate::{Error, Result};

/// Growable dense table of fixed-width state vectors, one row per node index.
///
/// Rows start at zero. The table grows by zero-padding when a larger index
/// is touched, leaving existing rows untouched. `version` increases on every
/// mutation, so callers can tell whether a snapshot is still current.
///
/// The table is a plain value: clone it to get an independent snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMemory {
    dim: usize,
    values: Vec<f32>,
    version: u64,
}

impl NodeMemory {
    /// Empty table of `dim`-wide rows.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            values: Vec::new(),
            version: 0,
        }
    }

    /// Table pre-sized to `num_nodes` zero rows.
    pub fn with_nodes(num_nodes: usize, dim: usize) -> Self {
        Self {
            dim,
            values: vec![0.0; num_nodes * dim],
            version: 0,
        }
    }

    /// Row width.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.values.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Grow to at least `num_nodes` rows. Returns whether the table grew.
    pub fn ensure_len(&mut self, num_nodes: usize) -> bool {
        let old = self.len();
        if num_nodes <= old {
            return false;
        }
        self.values.resize(num_nodes * self.dim, 0.0);
        self.version += 1;
        tracing::debug!(from = old, to = num_nodes, "grew node memory");
        true
    }

    /// State of one node; `None` past the end of the table.
    pub fn row(&self, node: u32) -> Option<&[f32]> {
        let start = node as usize * self.dim;
        self.values.get(start..start + self.dim)
    }

    /// Overwrite one node's state, growing the table if needed.
    pub fn set_row(&mut self, node: u32, state: &[f32]) -> Result<()> {
        if state.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: state.len(),
            });
        }
        self.ensure_len(node as usize + 1);
        let start = node as usize * self.dim;
        self.values[start..start + self.dim].copy_from_slice(state);
        self.version += 1;
        Ok(())
    }

    /// Zero every row, keeping the size.
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
        self.version += 1;
    }

    /// One node's state as a `(1, dim)` tensor; zeros past the end.
    pub fn row_tensor(&self, node: u32, device: &Device) -> Result<Tensor> {
        let t = match self.row(node) {
            Some(row) => Tensor::from_slice(row, (1, self.dim), device)?,
            None => Tensor::zeros((1, self.dim), candle_core::DType::F32, device)?,
        };
        Ok(t)
    }

    /// The whole table as a `(len, dim)` tensor.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::from_slice(&self.values, (self.len(), self.dim), device)?)
    }

    /// Flat row-major storage.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_preserves_prefix() {
        let mut m = NodeMemory::with_nodes(2, 3);
        m.set_row(0, &[1.0, 2.0, 3.0]).unwrap();
        m.set_row(1, &[4.0, 5.0, 6.0]).unwrap();
        let before = m.as_slice().to_vec();

        assert!(m.ensure_len(5));
        assert_eq!(m.len(), 5);
        assert_eq!(&m.as_slice()[..6], before.as_slice());
        assert!(m.as_slice()[6..].iter().all(|&v| v == 0.0));
        assert!(!m.ensure_len(3));
    }

    #[test]
    fn test_set_row_grows_and_bumps_version() {
        let mut m = NodeMemory::new(2);
        let v0 = m.version();
        m.set_row(4, &[0.5, -0.5]).unwrap();

        assert_eq!(m.len(), 5);
        assert_eq!(m.row(4), Some(&[0.5, -0.5][..]));
        assert_eq!(m.row(3), Some(&[0.0, 0.0][..]));
        assert!(m.version() > v0);
    }

    #[test]
    fn test_set_row_checks_width() {
        let mut m = NodeMemory::new(2);
        assert!(matches!(
            m.set_row(0, &[1.0]),
            Err(Error::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut m = NodeMemory::with_nodes(1, 2);
        let snapshot = m.clone();
        m.set_row(0, &[1.0, 1.0]).unwrap();

        assert_eq!(snapshot.row(0), Some(&[0.0, 0.0][..]));
        assert_ne!(snapshot, m);
    }

    #[test]
    fn test_row_tensor_past_end_is_zero() {
        let m = NodeMemory::new(4);
        let t = m.row_tensor(7, &Device::Cpu).unwrap();

        assert_eq!(t.dims(), &[1, 4]);
        assert_eq!(t.flatten_all().unwrap().to_vec1::<f32>().unwrap(), vec![0.0; 4]);
    }
}
