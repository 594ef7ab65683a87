//! Sequential semantics of the memory recurrence.

use cadence_core::EdgeBatch;
use cadence_nn::{MemoryRecurrence, NodeMemory, RecurrenceDims};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use proptest::prelude::*;

const DIMS: RecurrenceDims = RecurrenceDims {
    feature_dim: 4,
    memory_dim: 6,
    time_dim: 6,
    time_buckets: 365,
    out_dim: 2,
};

fn recurrence(varmap: &VarMap) -> (MemoryRecurrence, Tensor) {
    let device = Device::Cpu;
    let vb = VarBuilder::from_varmap(varmap, DType::F32, &device);
    let rec = MemoryRecurrence::new(DIMS, vb).unwrap();
    let x = Tensor::randn(0f32, 1f32, (3, DIMS.feature_dim), &device).unwrap();
    (rec, x)
}

#[test]
fn later_edge_sees_earlier_update() {
    let varmap = VarMap::new();
    let (rec, x) = recurrence(&varmap);

    let in_order = [(0, 1), (1, 2)];
    let in_order_t = [10.0, 20.0];
    let mut forward = NodeMemory::new(DIMS.memory_dim);
    rec.update(&mut forward, EdgeBatch::new(&in_order, &in_order_t).unwrap(), &x)
        .unwrap();

    let swapped = [(1, 2), (0, 1)];
    let swapped_t = [20.0, 10.0];
    let mut backward = NodeMemory::new(DIMS.memory_dim);
    rec.update(&mut backward, EdgeBatch::new(&swapped, &swapped_t).unwrap(), &x)
        .unwrap();

    // node 1 ends in the same state either way; node 2 only differs because
    // its edge read node 1's updated state in the first run
    assert_eq!(forward.row(1), backward.row(1));
    assert_ne!(forward.row(2), backward.row(2));
}

#[test]
fn rerun_without_reset_differs() {
    let varmap = VarMap::new();
    let (rec, x) = recurrence(&varmap);
    let edges = [(0, 1), (1, 2)];
    let times = [10.0, 20.0];
    let mut memory = NodeMemory::new(DIMS.memory_dim);

    let first = rec
        .update(&mut memory, EdgeBatch::new(&edges, &times).unwrap(), &x)
        .unwrap()
        .to_vec2::<f32>()
        .unwrap();
    let second = rec
        .update(&mut memory, EdgeBatch::new(&edges, &times).unwrap(), &x)
        .unwrap()
        .to_vec2::<f32>()
        .unwrap();
    assert_ne!(first, second);

    memory.reset();
    let third = rec
        .update(&mut memory, EdgeBatch::new(&edges, &times).unwrap(), &x)
        .unwrap()
        .to_vec2::<f32>()
        .unwrap();
    assert_eq!(first, third);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn growth_preserves_prefix(
        rows in prop::collection::vec(prop::collection::vec(-10f32..10.0, 3), 1..20),
        extra in 1usize..50,
    ) {
        let mut memory = NodeMemory::new(3);
        for (i, row) in rows.iter().enumerate() {
            memory.set_row(i as u32, row).unwrap();
        }
        let before: Vec<u32> = memory.as_slice().iter().map(|v| v.to_bits()).collect();

        prop_assert!(memory.ensure_len(rows.len() + extra));

        let after: Vec<u32> = memory.as_slice()[..before.len()].iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(before, after);
        prop_assert!(memory.as_slice()[rows.len() * 3..].iter().all(|&v| v == 0.0));
    }
}
