#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

//! Node memory recurrence and graph scoring models.
//!
//! `cadence-nn` sits between the structure layer (`cadence-core`) and the
//! metrics (`cadence-eval`): it turns an [`InteractionGraph`](cadence_core::InteractionGraph)
//! into tensors, scores it with one of four models and trains them.
//!
//! # Modules
//!
//! - [`memory`]: growable per-node state table
//! - [`time`]: periodic (day-of-year) time embedding
//! - [`recurrence`]: message, GRU update and readout, edge by edge
//! - [`conv`]: message-passing layers (GCN, GraphSAGE)
//! - [`models`]: the [`ScoringModel`] trait and its four implementations
//! - [`trainer`]: full-graph Adam training and evaluation
//!
//! # Example: Memory Update
//!
//! ```rust
//! use cadence_core::EdgeBatch;
//! use cadence_nn::{MemoryRecurrence, NodeMemory, RecurrenceDims};
//! use candle_core::{DType, Device, Tensor};
//! use candle_nn::{VarBuilder, VarMap};
//!
//! let varmap = VarMap::new();
//! let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
//! let dims = RecurrenceDims { feature_dim: 4, memory_dim: 8, time_dim: 8, time_buckets: 365, out_dim: 2 };
//! let recurrence = MemoryRecurrence::new(dims, vb)?;
//!
//! let features = Tensor::zeros((3, 4), DType::F32, &Device::Cpu)?;
//! let edges = [(0, 1), (1, 2)];
//! let times = [1.0, 2.0];
//! let mut memory = NodeMemory::new(8);
//!
//! let scores = recurrence.update(&mut memory, EdgeBatch::new(&edges, &times)?, &features)?;
//! assert_eq!(scores.dims(), &[2, 2]);
//! assert_eq!(memory.len(), 3);
//! # Ok::<(), cadence_nn::Error>(())
//! ```

pub mod conv;
pub mod error;
mod input;
pub mod memory;
pub mod models;
pub mod recurrence;
pub mod time;
pub mod trainer;

pub use error::{Error, Result};
pub use input::{EdgeIndex, GraphTensors};
pub use memory::NodeMemory;
pub use models::{build_model, ModelDims, ModelKind, PredictionTarget, ScoringModel};
pub use recurrence::{MemoryRecurrence, RecurrenceDims};
pub use time::{time_bucket, PeriodicTimeEncoder, DAYS_PER_YEAR};
pub use trainer::{EpochStats, TrainConfig, Trainer, TrainingHistory};
