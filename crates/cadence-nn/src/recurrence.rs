//! Temporal memory recurrence.
//!
//! For each edge `(src, dst, t)`, in order:
//!
//! ```text
//! m   = tanh(W_msg [x_src || s_src || T(t mod P)] + b)
//! s'  = GRU(m, s_dst)
//! y   = W_out s' + b_out
//! ```
//!
//! `s'` replaces the stored state of `dst` before the next edge is read, so
//! later edges in a batch see memory already updated by earlier ones. The
//! reduction is sequential by construction; batches cannot be reordered.

use candle_core::{DType, Tensor};
use candle_nn::rnn::{gru, GRUConfig, GRUState, GRU, RNN};
use candle_nn::{linear, Linear, Module, VarBuilder};

use cadence_core::EdgeBatch;

use crate::memory::NodeMemory;
use crate::time::PeriodicTimeEncoder;
use crate::{Error, Result};

/// Sizes of the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceDims {
    /// Width of node feature rows.
    pub feature_dim: usize,
    /// Width of node memory and of the message.
    pub memory_dim: usize,
    /// Width of the time embedding.
    pub time_dim: usize,
    /// Period of the time encoding.
    pub time_buckets: usize,
    /// Width of the score vector.
    pub out_dim: usize,
}

/// Message function, gated memory update and readout.
pub struct MemoryRecurrence {
    time: PeriodicTimeEncoder,
    message_fn: Linear,
    cell: GRU,
    readout: Linear,
    dims: RecurrenceDims,
}

impl MemoryRecurrence {
    pub fn new(dims: RecurrenceDims, vb: VarBuilder) -> Result<Self> {
        let time = PeriodicTimeEncoder::new(dims.time_buckets, dims.time_dim, vb.pp("time"))?;
        let message_fn = linear(
            dims.feature_dim + dims.memory_dim + dims.time_dim,
            dims.memory_dim,
            vb.pp("message"),
        )?;
        let cell = gru(dims.memory_dim, dims.memory_dim, GRUConfig::default(), vb.pp("gru"))?;
        let readout = linear(dims.memory_dim, dims.out_dim, vb.pp("readout"))?;

        Ok(Self {
            time,
            message_fn,
            cell,
            readout,
            dims,
        })
    }

    pub fn dims(&self) -> RecurrenceDims {
        self.dims
    }

    /// Run the batch through memory in place.
    ///
    /// # Arguments
    /// - `memory`: node states, grown to cover every index in `batch`
    /// - `batch`: edges in processing order
    /// - `features`: node features `(N x feature_dim)`, every edge source `< N`
    ///
    /// # Returns
    /// - One score row per edge `(E x out_dim)`, computed from the updated
    ///   destination state
    pub fn update(
        &self,
        memory: &mut NodeMemory,
        batch: EdgeBatch<'_>,
        features: &Tensor,
    ) -> Result<Tensor> {
        let device = features.device();
        let (num_rows, feature_dim) = features.dims2()?;
        if feature_dim != self.dims.feature_dim {
            return Err(Error::DimensionMismatch {
                expected: self.dims.feature_dim,
                got: feature_dim,
            });
        }
        if memory.dim() != self.dims.memory_dim {
            return Err(Error::DimensionMismatch {
                expected: self.dims.memory_dim,
                got: memory.dim(),
            });
        }

        let Some(max_index) = batch.max_index() else {
            return Ok(Tensor::zeros((0, self.dims.out_dim), DType::F32, device)?);
        };
        memory.ensure_len(max_index as usize + 1);

        let time_embeds = self.time.encode(batch.times(), device)?;
        let mut scores = Vec::with_capacity(batch.len());

        for (i, edge) in batch.iter().enumerate() {
            if edge.src as usize >= num_rows {
                return Err(Error::NodeOutOfRange {
                    index: edge.src,
                    len: num_rows,
                });
            }
            let x_src = features.narrow(0, edge.src as usize, 1)?;
            let s_src = memory.row_tensor(edge.src, device)?;
            let s_dst = memory.row_tensor(edge.dst, device)?;
            let t_enc = time_embeds.narrow(0, i, 1)?;

            let input = Tensor::cat(&[&x_src, &s_src, &t_enc], 1)?;
            let message = self.message_fn.forward(&input)?.tanh()?;
            let state = self.cell.step(&message, &GRUState { h: s_dst })?;

            let updated = state.h();
            memory.set_row(edge.dst, &updated.flatten_all()?.to_vec1::<f32>()?)?;
            scores.push(self.readout.forward(updated)?);
        }

        Ok(Tensor::cat(&scores, 0)?)
    }

    /// Like [`update`](Self::update), but on a copy of `memory`.
    ///
    /// The input table is left as it was; the advanced copy is returned
    /// alongside the scores.
    pub fn update_detached(
        &self,
        memory: &NodeMemory,
        batch: EdgeBatch<'_>,
        features: &Tensor,
    ) -> Result<(NodeMemory, Tensor)> {
        let mut next = memory.clone();
        let scores = self.update(&mut next, batch, features)?;
        Ok((next, scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;
    use candle_nn::VarMap;

    fn dims() -> RecurrenceDims {
        RecurrenceDims {
            feature_dim: 4,
            memory_dim: 8,
            time_dim: 8,
            time_buckets: 365,
            out_dim: 2,
        }
    }

    fn setup(varmap: &VarMap) -> (MemoryRecurrence, Tensor) {
        let device = Device::Cpu;
        let vb = VarBuilder::from_varmap(varmap, DType::F32, &device);
        let rec = MemoryRecurrence::new(dims(), vb).unwrap();
        let x = Tensor::randn(0f32, 1f32, (3, 4), &device).unwrap();
        (rec, x)
    }

    #[test]
    fn test_update_shapes_and_growth() {
        let varmap = VarMap::new();
        let (rec, x) = setup(&varmap);
        let mut memory = NodeMemory::new(8);

        let edges = [(0, 1), (1, 2)];
        let times = [10.0, 20.0];
        let batch = EdgeBatch::new(&edges, &times).unwrap();
        let scores = rec.update(&mut memory, batch, &x).unwrap();

        assert_eq!(scores.dims(), &[2, 2]);
        assert_eq!(memory.len(), 3);
        // node 0 is only ever a source
        assert_eq!(memory.row(0), Some(&[0.0; 8][..]));
        assert!(memory.row(2).unwrap().iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_empty_batch() {
        let varmap = VarMap::new();
        let (rec, x) = setup(&varmap);
        let mut memory = NodeMemory::new(8);
        let batch = EdgeBatch::new(&[], &[]).unwrap();

        let scores = rec.update(&mut memory, batch, &x).unwrap();
        assert_eq!(scores.dims(), &[0, 2]);
        assert_eq!(memory.version(), 0);
    }

    #[test]
    fn test_source_out_of_range() {
        let varmap = VarMap::new();
        let (rec, x) = setup(&varmap);
        let mut memory = NodeMemory::new(8);
        let edges = [(5, 0)];
        let times = [1.0];
        let batch = EdgeBatch::new(&edges, &times).unwrap();

        assert!(matches!(
            rec.update(&mut memory, batch, &x),
            Err(Error::NodeOutOfRange { index: 5, len: 3 })
        ));
    }

    #[test]
    fn test_memory_width_checked() {
        let varmap = VarMap::new();
        let (rec, x) = setup(&varmap);
        let mut memory = NodeMemory::new(3);
        let batch = EdgeBatch::new(&[], &[]).unwrap();

        assert!(matches!(
            rec.update(&mut memory, batch, &x),
            Err(Error::DimensionMismatch { expected: 8, got: 3 })
        ));
    }

    #[test]
    fn test_detached_update_leaves_input() {
        let varmap = VarMap::new();
        let (rec, x) = setup(&varmap);
        let memory = NodeMemory::with_nodes(3, 8);
        let edges = [(0, 1)];
        let times = [5.0];
        let batch = EdgeBatch::new(&edges, &times).unwrap();

        let (next, _) = rec.update_detached(&memory, batch, &x).unwrap();
        assert_eq!(memory, NodeMemory::with_nodes(3, 8));
        assert_ne!(next, memory);
    }
}
