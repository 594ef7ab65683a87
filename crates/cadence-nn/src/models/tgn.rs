use candle_core::Tensor;
use candle_nn::VarBuilder;

use super::{ModelDims, ModelKind, ScoringModel, NUM_CLASSES};
use crate::input::GraphTensors;
use crate::memory::NodeMemory;
use crate::recurrence::{MemoryRecurrence, RecurrenceDims};
use crate::Result;

/// Temporal graph memory model: one recurrence step per edge, scored from
/// the destination's updated state.
///
/// Scoring advances `memory` in place.
pub struct TemporalMemoryModel {
    recurrence: MemoryRecurrence,
}

impl TemporalMemoryModel {
    pub fn new(dims: ModelDims, vb: VarBuilder) -> Result<Self> {
        let recurrence = MemoryRecurrence::new(
            RecurrenceDims {
                feature_dim: dims.feature_dim,
                memory_dim: dims.hidden_dim,
                time_dim: dims.hidden_dim,
                time_buckets: dims.time_buckets,
                out_dim: NUM_CLASSES,
            },
            vb,
        )?;
        Ok(Self { recurrence })
    }
}

impl ScoringModel for TemporalMemoryModel {
    fn kind(&self) -> ModelKind {
        ModelKind::TemporalMemory
    }

    fn score(&self, graph: &GraphTensors, memory: &mut NodeMemory) -> Result<Tensor> {
        self.recurrence
            .update(memory, graph.batch()?, graph.features())
    }
}
