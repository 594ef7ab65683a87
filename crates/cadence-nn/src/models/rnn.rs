use candle_core::{DType, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};

use super::{ModelDims, ModelKind, ScoringModel, NUM_CLASSES};
use crate::input::GraphTensors;
use crate::memory::NodeMemory;
use crate::Result;

/// Elman recurrent cell over edge sources.
///
/// Edges are visited in time order and each source feature vector takes one
/// step from a zero hidden state: `h = tanh(W_ih x + W_hh 0 + b)`. Output
/// rows come back in the graph's edge order.
pub struct RecurrentModel {
    input: Linear,
    hidden: Linear,
    readout: Linear,
    hidden_dim: usize,
}

impl RecurrentModel {
    pub fn new(dims: ModelDims, vb: VarBuilder) -> Result<Self> {
        let input = linear(dims.feature_dim, dims.hidden_dim, vb.pp("ih"))?;
        let hidden = linear(dims.hidden_dim, dims.hidden_dim, vb.pp("hh"))?;
        let readout = linear(dims.hidden_dim, NUM_CLASSES, vb.pp("readout"))?;
        Ok(Self {
            input,
            hidden,
            readout,
            hidden_dim: dims.hidden_dim,
        })
    }
}

/// Permutation visiting edges by time (stable), and its inverse.
fn time_order(times: &[f64]) -> (Vec<u32>, Vec<u32>) {
    let mut order: Vec<u32> = (0..times.len() as u32).collect();
    order.sort_by(|&a, &b| times[a as usize].total_cmp(&times[b as usize]));

    let mut inverse = vec![0u32; order.len()];
    for (pos, &edge) in order.iter().enumerate() {
        inverse[edge as usize] = pos as u32;
    }
    (order, inverse)
}

impl ScoringModel for RecurrentModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Recurrent
    }

    fn score(&self, graph: &GraphTensors, _memory: &mut NodeMemory) -> Result<Tensor> {
        let device = graph.device();
        let num_edges = graph.num_edges();
        if num_edges == 0 {
            return Ok(Tensor::zeros((0, NUM_CLASSES), DType::F32, device)?);
        }

        let (order, inverse) = time_order(graph.times());
        let order = Tensor::from_vec(order, num_edges, device)?;
        let inverse = Tensor::from_vec(inverse, num_edges, device)?;

        let sources = graph.source_index().index_select(&order, 0)?;
        let x = graph.features().index_select(&sources, 0)?;
        let h0 = Tensor::zeros((num_edges, self.hidden_dim), DType::F32, device)?;

        let h = (self.input.forward(&x)? + self.hidden.forward(&h0)?)?.tanh()?;
        let logits = self.readout.forward(&h)?;
        Ok(logits.index_select(&inverse, 0)?)
    }
}
