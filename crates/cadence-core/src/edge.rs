//! Temporal edge types.

use std::ops::Range;

use crate::{Error, Result};

/// Timestamp type (seconds since the Unix epoch, or any monotonic real unit).
pub type Timestamp = f64;

/// A directed, timestamped interaction between two dense node indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalEdge {
    /// Source node index (the actor).
    pub src: u32,
    /// Destination node index (the target).
    pub dst: u32,
    /// Time when the interaction occurred.
    pub time: Timestamp,
}

impl TemporalEdge {
    /// Create a new temporal edge.
    pub fn new(src: u32, dst: u32, time: Timestamp) -> Self {
        Self { src, dst, time }
    }
}

/// A borrowed, ordered run of edges with their aligned timestamps.
///
/// Batches are what the memory recurrence consumes: edges are visited in
/// slice order, which is the order they were appended to the graph.
#[derive(Debug, Clone, Copy)]
pub struct EdgeBatch<'a> {
    edges: &'a [(u32, u32)],
    times: &'a [Timestamp],
}

impl<'a> EdgeBatch<'a> {
    /// Pair an edge list with its timestamps.
    pub fn new(edges: &'a [(u32, u32)], times: &'a [Timestamp]) -> Result<Self> {
        if edges.len() != times.len() {
            return Err(Error::MisalignedBatch {
                edges: edges.len(),
                times: times.len(),
            });
        }
        Ok(Self { edges, times })
    }

    pub(crate) fn from_aligned(edges: &'a [(u32, u32)], times: &'a [Timestamp]) -> Self {
        Self { edges, times }
    }

    /// Number of edges in the batch.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the batch holds no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edge at position `i`.
    pub fn get(&self, i: usize) -> Option<TemporalEdge> {
        let (src, dst) = *self.edges.get(i)?;
        Some(TemporalEdge::new(src, dst, self.times[i]))
    }

    /// Sub-batch over a positional range, clamped to the batch length.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.edges.len());
        let start = range.start.min(end);
        Self {
            edges: &self.edges[start..end],
            times: &self.times[start..end],
        }
    }

    /// Largest node index referenced by any edge, if the batch is non-empty.
    pub fn max_index(&self) -> Option<u32> {
        self.edges.iter().map(|&(s, d)| s.max(d)).max()
    }

    /// Raw edge pairs.
    pub fn edges(&self) -> &'a [(u32, u32)] {
        self.edges
    }

    /// Raw timestamps.
    pub fn times(&self) -> &'a [Timestamp] {
        self.times
    }

    /// Iterate the edges in order.
    pub fn iter(&self) -> impl Iterator<Item = TemporalEdge> + 'a {
        self.edges
            .iter()
            .zip(self.times.iter())
            .map(|(&(src, dst), &time)| TemporalEdge::new(src, dst, time))
    }
}
