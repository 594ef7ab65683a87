//! Tensor view of an interaction graph, shared by all scoring models.
//!
//! Message passing runs over the edge list: messages are gathered from
//! edge sources with `index_select` and summed onto destinations with
//! `index_add`, so memory grows with `N + E`, never `N^2`.

use candle_core::{Device, Tensor};

use cadence_core::{EdgeBatch, FeatureTable, InteractionGraph, Timestamp};

use crate::{Error, Result};

/// Edge list as index tensors, with the per-edge and per-node weights the
/// convolutions need.
#[derive(Debug, Clone)]
pub struct EdgeIndex {
    src: Tensor,
    dst: Tensor,
    /// `1 / sqrt(deg(src) * deg(dst))` per edge, `(E, 1)`.
    gcn_edge: Tensor,
    /// `1 / deg(v)` per node, the self-loop weight, `(N, 1)`.
    gcn_self: Tensor,
    /// `1 / in_degree(v)`, 0 for nodes without incoming edges, `(N, 1)`.
    inv_in_degree: Tensor,
    num_nodes: usize,
    num_edges: usize,
}

impl EdgeIndex {
    /// GCN degrees count incoming edges plus the self-loop.
    pub fn new(graph: &InteractionGraph, device: &Device) -> Result<Self> {
        let n = graph.num_nodes();
        let edges = graph.edges();

        let in_degree: Vec<f32> = (0..n as u32).map(|v| graph.in_degree(v) as f32).collect();
        let inv_sqrt: Vec<f32> = in_degree.iter().map(|d| (d + 1.0).sqrt().recip()).collect();

        let gcn_edge: Vec<f32> = edges
            .iter()
            .map(|&(s, d)| inv_sqrt[s as usize] * inv_sqrt[d as usize])
            .collect();
        let gcn_self: Vec<f32> = in_degree.iter().map(|d| (d + 1.0).recip()).collect();
        let inv_in_degree: Vec<f32> = in_degree
            .iter()
            .map(|&d| if d > 0.0 { d.recip() } else { 0.0 })
            .collect();

        let src: Vec<u32> = edges.iter().map(|&(s, _)| s).collect();
        let dst: Vec<u32> = edges.iter().map(|&(_, d)| d).collect();

        Ok(Self {
            src: Tensor::from_vec(src, edges.len(), device)?,
            dst: Tensor::from_vec(dst, edges.len(), device)?,
            gcn_edge: Tensor::from_vec(gcn_edge, (edges.len(), 1), device)?,
            gcn_self: Tensor::from_vec(gcn_self, (n, 1), device)?,
            inv_in_degree: Tensor::from_vec(inv_in_degree, (n, 1), device)?,
            num_nodes: n,
            num_edges: edges.len(),
        })
    }

    /// Source of every edge, `(E,)` u32.
    pub fn src(&self) -> &Tensor {
        &self.src
    }

    /// Destination of every edge, `(E,)` u32.
    pub fn dst(&self) -> &Tensor {
        &self.dst
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// `D^-1/2 (A + I) D^-1/2 h`, with `A[dst][src]` counting edges.
    pub fn gcn_propagate(&self, h: &Tensor) -> candle_core::Result<Tensor> {
        let self_term = h.broadcast_mul(&self.gcn_self)?;
        if self.num_edges == 0 {
            return Ok(self_term);
        }
        let messages = h.index_select(&self.src, 0)?.broadcast_mul(&self.gcn_edge)?;
        self_term.index_add(&self.dst, &messages, 0)
    }

    /// Mean of incoming source rows per node; zero for nodes with no
    /// incoming edges.
    pub fn mean_neighbors(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let (_, dim) = x.dims2()?;
        let zeros = Tensor::zeros((self.num_nodes, dim), x.dtype(), x.device())?;
        if self.num_edges == 0 {
            return Ok(zeros);
        }
        let sum = zeros.index_add(&self.dst, &x.index_select(&self.src, 0)?, 0)?;
        sum.broadcast_mul(&self.inv_in_degree)
    }
}

/// Node features, labels and edge list of one graph, on one device.
#[derive(Debug, Clone)]
pub struct GraphTensors {
    x: Tensor,
    labels: Vec<u8>,
    edges: Vec<(u32, u32)>,
    times: Vec<Timestamp>,
    edge_index: EdgeIndex,
    device: Device,
}

impl GraphTensors {
    /// Gather the graph's first `num_nodes` feature rows and labels.
    ///
    /// `features` and `labels` must cover every node of `graph`.
    pub fn new(
        graph: &InteractionGraph,
        features: &FeatureTable,
        labels: &[u8],
        device: &Device,
    ) -> Result<Self> {
        let n = graph.num_nodes();
        if features.num_nodes() < n {
            return Err(Error::DimensionMismatch {
                expected: n,
                got: features.num_nodes(),
            });
        }
        if labels.len() < n {
            return Err(Error::DimensionMismatch {
                expected: n,
                got: labels.len(),
            });
        }

        let dim = features.dim();
        let x = Tensor::from_slice(&features.as_slice()[..n * dim], (n, dim), device)?;

        Ok(Self {
            x,
            labels: labels[..n].to_vec(),
            edges: graph.edges().to_vec(),
            times: graph.edge_times().to_vec(),
            edge_index: EdgeIndex::new(graph, device)?,
            device: device.clone(),
        })
    }

    /// Node features `(N x F)`.
    pub fn features(&self) -> &Tensor {
        &self.x
    }

    pub fn num_nodes(&self) -> usize {
        self.edge_index.num_nodes()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The edges in graph order.
    pub fn batch(&self) -> Result<EdgeBatch<'_>> {
        Ok(EdgeBatch::new(&self.edges, &self.times)?)
    }

    /// Edge timestamps.
    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    pub fn edge_index(&self) -> &EdgeIndex {
        &self.edge_index
    }

    /// Source index of every edge, `(E,)` u32.
    pub fn source_index(&self) -> &Tensor {
        self.edge_index.src()
    }

    /// One label per node.
    pub fn node_labels(&self) -> &[u8] {
        &self.labels
    }

    /// Label of each edge's destination node, in edge order.
    pub fn destination_labels(&self) -> Vec<u8> {
        self.edges
            .iter()
            .map(|&(_, d)| self.labels[d as usize])
            .collect()
    }
}
