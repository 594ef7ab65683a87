#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

//! Interaction events and temporal graph indexing.
//!
//! This crate turns an implicit-feedback log (who touched what, when) into
//! the indexed form the learning code consumes:
//!
//! - [`Event`] - one `(actor, target, time)` interaction
//! - [`ingest`] - CSV reading (Last.fm layout by default)
//! - [`split`] - most-active-actor filtering and chronological train/test split
//! - [`InteractionGraph`] - dense node ids, directed edge list, aligned edge times
//! - [`EdgeBatch`] - an ordered slice of edges, the unit of memory updates
//! - [`FeatureTable`] - per-node feature rows
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{build_graph, split::chronological_split, Event};
//!
//! let events: Vec<Event> = (0..10)
//!     .map(|i| Event::new(format!("user{}", i % 3), format!("track{}", i % 4), i as f64))
//!     .collect();
//!
//! let (train, test) = chronological_split(&events, 0.2)?;
//! let graph = build_graph(&train);
//!
//! assert_eq!(graph.num_edges(), 8);
//! assert_eq!(test.len(), 2);
//! # Ok::<(), cadence_core::Error>(())
//! ```

mod edge;
mod error;
mod event;
pub mod features;
mod graph;
pub mod ingest;
pub mod split;

pub use edge::{EdgeBatch, TemporalEdge, Timestamp};
pub use error::{Error, Result};
pub use event::{is_chronological, sort_chronologically, Event};
pub use features::{random_labels, FeatureTable};
pub use graph::{build_graph, GraphBuilder, InteractionGraph};
pub use ingest::{read_events, read_events_path, ColumnSpec, TimeColumns};
