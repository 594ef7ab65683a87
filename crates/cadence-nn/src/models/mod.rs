//! Scoring models.
//!
//! Every model maps a [`GraphTensors`] to two-class logits. Node models emit
//! one row per node; destination models emit one row per edge, scored
//! against the label of the edge's destination. The trainer and evaluation
//! path only see [`ScoringModel`].

mod htgnn;
mod rnn;
mod sage;
mod tgn;

use std::fmt;
use std::str::FromStr;

use candle_core::Tensor;
use candle_nn::VarBuilder;

use crate::input::GraphTensors;
use crate::memory::NodeMemory;
use crate::{Error, Result};

pub use htgnn::Htgnn;
pub use rnn::RecurrentModel;
pub use sage::GraphSage;
pub use tgn::TemporalMemoryModel;

/// Number of output classes.
pub const NUM_CLASSES: usize = 2;

/// What a model's output rows correspond to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionTarget {
    /// One row per node.
    Nodes,
    /// One row per edge, labelled by the destination node.
    Destinations,
}

impl PredictionTarget {
    /// Ground-truth labels aligned with the model's output rows.
    pub fn labels(self, graph: &GraphTensors) -> Vec<u8> {
        match self {
            Self::Nodes => graph.node_labels().to_vec(),
            Self::Destinations => graph.destination_labels(),
        }
    }
}

/// The model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Two GCN layers with summed periodic time embeddings.
    Htgnn,
    /// Two mean-aggregating GraphSAGE layers.
    GraphSage,
    /// Per-node memory updated edge by edge.
    TemporalMemory,
    /// Single-step recurrent cell over time-ordered edge sources.
    Recurrent,
}

impl ModelKind {
    pub fn all() -> [ModelKind; 4] {
        [
            Self::Htgnn,
            Self::GraphSage,
            Self::TemporalMemory,
            Self::Recurrent,
        ]
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Htgnn => "htgnn",
            Self::GraphSage => "sage",
            Self::TemporalMemory => "tgn",
            Self::Recurrent => "rnn",
        }
    }

    pub fn target(self) -> PredictionTarget {
        match self {
            Self::Htgnn | Self::GraphSage => PredictionTarget::Nodes,
            Self::TemporalMemory | Self::Recurrent => PredictionTarget::Destinations,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "htgnn" => Ok(Self::Htgnn),
            "sage" | "graphsage" => Ok(Self::GraphSage),
            "tgn" | "memory" => Ok(Self::TemporalMemory),
            "rnn" => Ok(Self::Recurrent),
            other => Err(Error::InvalidConfig(format!("unknown model '{other}'"))),
        }
    }
}

/// Layer widths shared by all models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDims {
    pub feature_dim: usize,
    pub hidden_dim: usize,
    pub time_buckets: usize,
}

/// A model producing two-class logits for a graph.
pub trait ScoringModel {
    fn kind(&self) -> ModelKind;

    fn target(&self) -> PredictionTarget {
        self.kind().target()
    }

    /// Logits `(rows x 2)`, rows as given by [`target`](Self::target).
    ///
    /// Stateless models ignore `memory`.
    fn score(&self, graph: &GraphTensors, memory: &mut NodeMemory) -> Result<Tensor>;
}

/// Construct a model of `kind`, registering its parameters in `vb`.
pub fn build_model(
    kind: ModelKind,
    dims: ModelDims,
    vb: VarBuilder,
) -> Result<Box<dyn ScoringModel>> {
    if dims.feature_dim == 0 || dims.hidden_dim == 0 {
        return Err(Error::InvalidConfig(
            "feature and hidden widths must be positive".into(),
        ));
    }
    Ok(match kind {
        ModelKind::Htgnn => Box::new(Htgnn::new(dims, vb)?),
        ModelKind::GraphSage => Box::new(GraphSage::new(dims, vb)?),
        ModelKind::TemporalMemory => Box::new(TemporalMemoryModel::new(dims, vb)?),
        ModelKind::Recurrent => Box::new(RecurrentModel::new(dims, vb)?),
    })
}
