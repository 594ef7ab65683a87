//! Interaction graph: dense node indexing over an ordered event stream.

use std::collections::HashMap;
use std::ops::Range;

use smallvec::SmallVec;

use crate::edge::{EdgeBatch, TemporalEdge, Timestamp};
use crate::event::Event;

/// A directed interaction graph with dense node indices.
///
/// Built once from a (chronologically ordered) event sequence:
/// - `node_index` maps every opaque id to a dense index in `[0, N)`,
///   assigned first-seen-wins over actors and targets alike
/// - `edges` and `edge_time` are aligned positionally, one entry per edge,
///   in the order the events were supplied
///
/// # Example
///
/// ```rust
/// use cadence_core::{build_graph, Event};
///
/// let events = vec![
///     Event::new("alice", "song-a", 100.0),
///     Event::new("bob", "song-a", 150.0),
/// ];
/// let graph = build_graph(&events);
///
/// assert_eq!(graph.num_nodes(), 3);
/// assert_eq!(graph.index_of("song-a"), Some(1));
/// assert_eq!(graph.edges(), &[(0, 1), (2, 1)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    /// Opaque id -> dense index.
    node_index: HashMap<String, u32>,
    /// Dense index -> opaque id.
    ids: Vec<String>,
    /// Directed edges (src, dst), in insertion order.
    edges: Vec<(u32, u32)>,
    /// Per-edge timestamps, aligned with `edges`.
    edge_time: Vec<Timestamp>,
    /// node -> outgoing edge positions.
    adj_out: Vec<SmallVec<[usize; 8]>>,
    /// node -> incoming edge positions.
    adj_in: Vec<SmallVec<[usize; 8]>>,
    min_time: Timestamp,
    max_time: Timestamp,
}

impl InteractionGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            min_time: Timestamp::INFINITY,
            max_time: Timestamp::NEG_INFINITY,
            ..Default::default()
        }
    }

    /// Create with estimated capacity.
    pub fn with_capacity(edges: usize, nodes: usize) -> Self {
        Self {
            node_index: HashMap::with_capacity(nodes),
            ids: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
            edge_time: Vec::with_capacity(edges),
            adj_out: Vec::with_capacity(nodes),
            adj_in: Vec::with_capacity(nodes),
            min_time: Timestamp::INFINITY,
            max_time: Timestamp::NEG_INFINITY,
        }
    }

    /// Index for `id`, allocating the next dense index on first sight.
    fn intern(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.ids.len() as u32;
        self.node_index.insert(id.to_owned(), idx);
        self.ids.push(id.to_owned());
        self.adj_out.push(SmallVec::new());
        self.adj_in.push(SmallVec::new());
        idx
    }

    /// Append one directed edge, interning both endpoints.
    fn push_edge(&mut self, src: u32, dst: u32, time: Timestamp) -> usize {
        let pos = self.edges.len();
        self.edges.push((src, dst));
        self.edge_time.push(time);
        self.adj_out[src as usize].push(pos);
        self.adj_in[dst as usize].push(pos);
        self.observe_time(time);
        pos
    }

    fn observe_time(&mut self, time: Timestamp) {
        self.min_time = self.min_time.min(time);
        self.max_time = self.max_time.max(time);
    }

    /// Number of distinct nodes (actors and targets).
    pub fn num_nodes(&self) -> usize {
        self.ids.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph holds no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Dense index of an opaque id.
    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.node_index.get(id).copied()
    }

    /// Opaque id of a dense index.
    pub fn id_of(&self, index: u32) -> Option<&str> {
        self.ids.get(index as usize).map(String::as_str)
    }

    /// The id -> index mapping.
    pub fn node_index(&self) -> &HashMap<String, u32> {
        &self.node_index
    }

    /// Edge list, aligned with [`edge_times`](Self::edge_times).
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Per-edge timestamps.
    pub fn edge_times(&self) -> &[Timestamp] {
        &self.edge_time
    }

    /// Iterator over all edges in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = TemporalEdge> + '_ {
        self.as_batch().iter()
    }

    /// The whole edge list as one batch.
    pub fn as_batch(&self) -> EdgeBatch<'_> {
        EdgeBatch::from_aligned(&self.edges, &self.edge_time)
    }

    /// A positional slice of the edge list, clamped to its length.
    pub fn batch(&self, range: Range<usize>) -> EdgeBatch<'_> {
        self.as_batch().slice(range)
    }

    /// Largest node index, `None` for an empty graph.
    pub fn max_index(&self) -> Option<u32> {
        self.ids.len().checked_sub(1).map(|i| i as u32)
    }

    /// Earliest and latest edge time, `None` for an empty graph.
    pub fn time_range(&self) -> Option<(Timestamp, Timestamp)> {
        if self.edges.is_empty() {
            None
        } else {
            Some((self.min_time, self.max_time))
        }
    }

    /// Number of outgoing edges of a node.
    pub fn out_degree(&self, node: u32) -> usize {
        self.adj_out.get(node as usize).map_or(0, |v| v.len())
    }

    /// Number of incoming edges of a node.
    pub fn in_degree(&self, node: u32) -> usize {
        self.adj_in.get(node as usize).map_or(0, |v| v.len())
    }
}

/// Configurable graph construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder {
    collapse_repeats: bool,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a single edge per (actor, target) pair.
    ///
    /// A repeat overwrites the stored timestamp of the first occurrence and
    /// adds no edge, so the edge keeps its original position.
    pub fn collapse_repeats(mut self, collapse: bool) -> Self {
        self.collapse_repeats = collapse;
        self
    }

    /// Build the graph in one pass over `events`.
    ///
    /// Events are consumed in the order given; callers sort them first.
    pub fn build(&self, events: &[Event]) -> InteractionGraph {
        let mut graph = InteractionGraph::with_capacity(events.len(), events.len() / 2);
        let mut pairs: HashMap<(u32, u32), usize> = HashMap::new();

        for event in events {
            let src = graph.intern(&event.actor);
            let dst = graph.intern(&event.target);

            if self.collapse_repeats {
                if let Some(&pos) = pairs.get(&(src, dst)) {
                    graph.edge_time[pos] = event.time;
                    graph.observe_time(event.time);
                    continue;
                }
                let pos = graph.push_edge(src, dst, event.time);
                pairs.insert((src, dst), pos);
            } else {
                graph.push_edge(src, dst, event.time);
            }
        }

        tracing::debug!(
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            collapsed = self.collapse_repeats,
            "built interaction graph"
        );
        graph
    }
}

/// Build an interaction graph with one edge per event.
pub fn build_graph(events: &[Event]) -> InteractionGraph {
    GraphBuilder::new().build(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> Vec<Event> {
        vec![
            Event::new("u1", "t1", 100.0),
            Event::new("u2", "t1", 200.0),
            Event::new("u1", "t2", 300.0),
            Event::new("u1", "t1", 400.0),
        ]
    }

    #[test]
    fn test_first_seen_numbering() {
        let g = build_graph(&events());

        assert_eq!(g.index_of("u1"), Some(0));
        assert_eq!(g.index_of("t1"), Some(1));
        assert_eq!(g.index_of("u2"), Some(2));
        assert_eq!(g.index_of("t2"), Some(3));
        assert_eq!(g.id_of(3), Some("t2"));
        assert_eq!(g.num_nodes(), 4);
    }

    #[test]
    fn test_one_edge_per_event() {
        let g = build_graph(&events());

        assert_eq!(g.edges(), &[(0, 1), (2, 1), (0, 3), (0, 1)]);
        assert_eq!(g.edge_times(), &[100.0, 200.0, 300.0, 400.0]);
        assert_eq!(g.time_range(), Some((100.0, 400.0)));
    }

    #[test]
    fn test_target_only_node_is_indexed() {
        let g = build_graph(&events());
        let t2 = g.index_of("t2").unwrap();

        assert_eq!(g.out_degree(t2), 0);
        assert_eq!(g.in_degree(t2), 1);
    }

    #[test]
    fn test_collapse_repeats_keeps_position_and_latest_time() {
        let g = GraphBuilder::new().collapse_repeats(true).build(&events());

        assert_eq!(g.edges(), &[(0, 1), (2, 1), (0, 3)]);
        assert_eq!(g.edge_times(), &[400.0, 200.0, 300.0]);
    }

    #[test]
    fn test_empty_graph() {
        let g = build_graph(&[]);

        assert_eq!(g.num_nodes(), 0);
        assert!(g.is_empty());
        assert_eq!(g.max_index(), None);
        assert_eq!(g.time_range(), None);
    }

    #[test]
    fn test_batch_range() {
        let g = build_graph(&events());
        let b = g.batch(1..3);

        assert_eq!(b.len(), 2);
        assert_eq!(b.get(0), Some(TemporalEdge::new(2, 1, 200.0)));
    }
}
