//! Log to tensors: ingestion, filtering, split, graphs and placeholder inputs.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use candle_core::Device;
use tracing::info;

use cadence_core::split::{chronological_split, top_actors};
use cadence_core::{build_graph, random_labels, read_events_path, Event, FeatureTable};
use cadence_nn::GraphTensors;

use crate::config::ExperimentConfig;

/// Train and test graphs of one experiment.
pub struct Prepared {
    pub num_events: usize,
    pub train: GraphTensors,
    pub test: GraphTensors,
}

pub fn load_events(path: &Path, config: &ExperimentConfig) -> Result<Vec<Event>> {
    let events = read_events_path(path, &config.data.columns)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(match config.data.top_actors {
        Some(k) => top_actors(&events, k),
        None => events,
    })
}

/// Split the log chronologically and build both graphs.
///
/// Features and labels are placeholders drawn from the configured seed; the
/// test graph uses the next seed.
pub fn prepare(path: &Path, config: &ExperimentConfig, device: &Device) -> Result<Prepared> {
    let events = load_events(path, config)?;
    ensure!(!events.is_empty(), "no events in {}", path.display());

    let (train, test) = chronological_split(&events, config.data.test_fraction)?;
    let seed = config.training.seed;
    let train = tensors(&train, config, seed, device)?;
    let test = tensors(&test, config, seed.wrapping_add(1), device)?;
    info!(
        events = events.len(),
        train_nodes = train.num_nodes(),
        train_edges = train.num_edges(),
        test_nodes = test.num_nodes(),
        test_edges = test.num_edges(),
        "prepared graphs"
    );

    Ok(Prepared {
        num_events: events.len(),
        train,
        test,
    })
}

fn tensors(
    events: &[Event],
    config: &ExperimentConfig,
    seed: u64,
    device: &Device,
) -> Result<GraphTensors> {
    let graph = build_graph(events);
    let n = graph.num_nodes();
    let features = FeatureTable::random_normal(n, config.training.feature_dim, seed);
    let labels = random_labels(n, seed);
    Ok(GraphTensors::new(&graph, &features, &labels, device)?)
}
