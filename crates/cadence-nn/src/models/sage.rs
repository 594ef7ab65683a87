use candle_core::Tensor;
use candle_nn::VarBuilder;

use super::{ModelDims, ModelKind, ScoringModel, NUM_CLASSES};
use crate::conv::SAGEConv;
use crate::input::GraphTensors;
use crate::memory::NodeMemory;
use crate::Result;

/// Two-layer GraphSAGE with mean aggregation.
pub struct GraphSage {
    conv1: SAGEConv,
    conv2: SAGEConv,
}

impl GraphSage {
    pub fn new(dims: ModelDims, vb: VarBuilder) -> Result<Self> {
        let conv1 = SAGEConv::new(dims.feature_dim, dims.hidden_dim, vb.pp("conv1"))?;
        let conv2 = SAGEConv::new(dims.hidden_dim, NUM_CLASSES, vb.pp("conv2"))?;
        Ok(Self { conv1, conv2 })
    }
}

impl ScoringModel for GraphSage {
    fn kind(&self) -> ModelKind {
        ModelKind::GraphSage
    }

    fn score(&self, graph: &GraphTensors, _memory: &mut NodeMemory) -> Result<Tensor> {
        let edges = graph.edge_index();
        let h = self.conv1.forward(graph.features(), edges)?.relu()?;
        Ok(self.conv2.forward(&h, edges)?)
    }
}
