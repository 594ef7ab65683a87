//! Message-passing convolutional layers over an edge list.
//!
//! - [`GCNConv`]: Graph Convolutional Network (Kipf & Welling, 2017)
//! - [`SAGEConv`]: GraphSAGE (Hamilton et al., 2017), mean aggregation
//!
//! Messages flow from edge source to edge destination through an
//! [`EdgeIndex`].

use candle_core::{Result, Tensor};
use candle_nn::{init, linear, linear_no_bias, Linear, Module, VarBuilder};

use crate::input::EdgeIndex;

/// Graph Convolutional Network layer.
///
/// Implements: H' = A_hat (H W) + b
///
/// Where A_hat is the normalised adjacency with self-loops. The bias is
/// added after propagation.
pub struct GCNConv {
    linear: Linear,
    bias: Tensor,
}

impl GCNConv {
    pub fn new(in_features: usize, out_features: usize, vb: VarBuilder) -> Result<Self> {
        let linear = linear_no_bias(in_features, out_features, vb.clone())?;
        let bias = vb.get_with_hints(out_features, "bias", init::ZERO)?;
        Ok(Self { linear, bias })
    }

    /// Forward pass.
    ///
    /// # Arguments
    /// - `x`: Node features (N x in_features)
    /// - `edges`: Edge list with GCN normalisation weights
    ///
    /// # Returns
    /// - Node embeddings (N x out_features)
    pub fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
        let h = self.linear.forward(x)?;
        edges.gcn_propagate(&h)?.broadcast_add(&self.bias)
    }
}

/// GraphSAGE convolutional layer.
///
/// h_i' = W_self h_i + W_neigh mean({h_j : j -> i})
pub struct SAGEConv {
    lin_self: Linear,
    lin_neighbor: Linear,
}

impl SAGEConv {
    pub fn new(in_features: usize, out_features: usize, vb: VarBuilder) -> Result<Self> {
        let lin_self = linear(in_features, out_features, vb.pp("lin_self"))?;
        let lin_neighbor = linear(in_features, out_features, vb.pp("lin_neighbor"))?;

        Ok(Self {
            lin_self,
            lin_neighbor,
        })
    }

    /// Forward pass.
    ///
    /// # Arguments
    /// - `x`: Node features (N x in_features)
    /// - `edges`: Edge list; isolated nodes aggregate to zero
    pub fn forward(&self, x: &Tensor, edges: &EdgeIndex) -> Result<Tensor> {
        let h_self = self.lin_self.forward(x)?;
        let h_neighbor = self.lin_neighbor.forward(&edges.mean_neighbors(x)?)?;
        h_self + h_neighbor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{build_graph, Event};
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    fn edges(events: &[Event]) -> EdgeIndex {
        EdgeIndex::new(&build_graph(events), &Device::Cpu).unwrap()
    }

    #[test]
    fn test_gcn_forward_shape() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let gcn = GCNConv::new(8, 4, vb).unwrap();
        let index = edges(&[Event::new("u", "a", 1.0), Event::new("v", "a", 2.0)]);

        let x = Tensor::randn(0f32, 1f32, (3, 8), &device).unwrap();
        let out = gcn.forward(&x, &index).unwrap();
        assert_eq!(out.dims(), &[3, 4]);
    }

    #[test]
    fn test_gcn_bias_added_after_propagation() {
        let device = Device::Cpu;
        let mut varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let gcn = GCNConv::new(3, 2, vb).unwrap();
        varmap
            .set_one("bias", Tensor::new(&[1f32, -2.], &device).unwrap())
            .unwrap();

        // a has three incoming edges, so its normalised row does not sum to 1
        let index = edges(&[
            Event::new("u", "a", 1.0),
            Event::new("v", "a", 2.0),
            Event::new("w", "a", 3.0),
        ]);
        let x = Tensor::zeros((4, 3), DType::F32, &device).unwrap();

        let out = gcn.forward(&x, &index).unwrap().to_vec2::<f32>().unwrap();
        for row in out {
            assert_eq!(row, vec![1.0, -2.0]);
        }
    }

    #[test]
    fn test_sage_mean_ignores_repeats() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let sage = SAGEConv::new(3, 2, vb).unwrap();

        // a hears from u twice: the mean equals hearing once
        let twice = edges(&[Event::new("u", "a", 1.0), Event::new("u", "a", 2.0)]);
        let once = edges(&[Event::new("u", "a", 1.0)]);
        let x = Tensor::randn(0f32, 1f32, (2, 3), &device).unwrap();

        let out = sage.forward(&x, &twice).unwrap();
        assert_eq!(out.dims(), &[2, 2]);

        let diff = (out - sage.forward(&x, &once).unwrap())
            .unwrap()
            .abs()
            .unwrap()
            .sum_all()
            .unwrap()
            .to_scalar::<f32>()
            .unwrap();
        assert!(diff < 1e-5);
    }
}
