use candle_core::{DType, Tensor};
use candle_nn::VarBuilder;

use super::{ModelDims, ModelKind, ScoringModel, NUM_CLASSES};
use crate::conv::GCNConv;
use crate::input::GraphTensors;
use crate::memory::NodeMemory;
use crate::time::PeriodicTimeEncoder;
use crate::Result;

/// Heterogeneous temporal GNN.
///
/// ```text
/// h   = relu(GCN(x))
/// tau = sum over edges leaving v of T(t mod P)
/// y   = GCN([h || tau])
/// ```
pub struct Htgnn {
    conv1: GCNConv,
    time: PeriodicTimeEncoder,
    conv2: GCNConv,
}

impl Htgnn {
    pub fn new(dims: ModelDims, vb: VarBuilder) -> Result<Self> {
        let conv1 = GCNConv::new(dims.feature_dim, dims.hidden_dim, vb.pp("conv1"))?;
        let time = PeriodicTimeEncoder::new(dims.time_buckets, dims.hidden_dim, vb.pp("time"))?;
        let conv2 = GCNConv::new(2 * dims.hidden_dim, NUM_CLASSES, vb.pp("conv2"))?;
        Ok(Self { conv1, time, conv2 })
    }

    /// Time embeddings summed per source node, `(N x time_dim)`.
    fn node_time(&self, graph: &GraphTensors) -> Result<Tensor> {
        let zeros = Tensor::zeros(
            (graph.num_nodes(), self.time.dim()),
            DType::F32,
            graph.device(),
        )?;
        if graph.num_edges() == 0 {
            return Ok(zeros);
        }
        let per_edge = self.time.encode(graph.times(), graph.device())?;
        Ok(zeros.index_add(graph.source_index(), &per_edge, 0)?)
    }
}

impl ScoringModel for Htgnn {
    fn kind(&self) -> ModelKind {
        ModelKind::Htgnn
    }

    fn score(&self, graph: &GraphTensors, _memory: &mut NodeMemory) -> Result<Tensor> {
        let edges = graph.edge_index();
        let h = self.conv1.forward(graph.features(), edges)?.relu()?;
        let h = Tensor::cat(&[&h, &self.node_time(graph)?], 1)?;
        Ok(self.conv2.forward(&h, edges)?)
    }
}
