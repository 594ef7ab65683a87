//! Temporal interaction graphs, node-memory recurrence and ranking metrics.
//!
//! Facade over the workspace crates:
//!
//! - [`core`]: events, CSV ingestion, chronological split, graph building
//! - [`nn`]: node memory, time encoding, scoring models and training
//! - [`eval`]: accuracy, macro precision/recall/F1, MRR and NDCG@k
//!
//! # Example
//!
//! ```rust
//! use cadence::core::{build_graph, random_labels, Event, FeatureTable};
//! use cadence::nn::{GraphTensors, ModelKind, TrainConfig, Trainer};
//! use candle_core::Device;
//!
//! let events: Vec<Event> = (0..12)
//!     .map(|i| Event::new(format!("u{}", i % 3), format!("t{}", i % 5), f64::from(i) * 86_400.0))
//!     .collect();
//! let graph = build_graph(&events);
//! let features = FeatureTable::random_normal(graph.num_nodes(), 8, 1);
//! let labels = random_labels(graph.num_nodes(), 1);
//! let tensors = GraphTensors::new(&graph, &features, &labels, &Device::Cpu)?;
//!
//! let mut trainer = Trainer::new(ModelKind::TemporalMemory, TrainConfig::default(), &Device::Cpu)?;
//! let history = trainer.fit(&tensors, &tensors)?;
//! assert_eq!(history.epochs.len(), 10);
//! # Ok::<(), cadence::nn::Error>(())
//! ```

pub use cadence_core as core;
pub use cadence_eval as eval;
pub use cadence_nn as nn;

pub use cadence_core::{build_graph, Event, InteractionGraph};
pub use cadence_eval::{EvaluationReport, ScoreBatch};
pub use cadence_nn::{ModelKind, NodeMemory, TrainConfig, Trainer};
