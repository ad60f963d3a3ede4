//! Structural properties of planner output over random shapes.

use mpmerkle_core::{Plan, TreeError};
use mpmerkle_scheduler::{expected_layer_count, plan};
use proptest::prelude::*;

/// Every layer is tiled by power-of-two chunks of at most `C`, unit ids run
/// sequentially from zero, and each layer's output feeds the next one.
#[track_caller]
fn assert_well_formed(p: &Plan) {
    let c = p.capacity();
    let mut expected_unit = 0u32;
    let mut expected_input = p.leaf_count();

    for (k, layer) in p.layers().iter().enumerate() {
        assert_eq!(layer.index as usize, k);
        assert_eq!(layer.input_size, expected_input);
        assert!(layer.input_size > c, "non-terminal layers exceed capacity");

        let mut cursor = 0usize;
        for chunk in &layer.chunks {
            assert_eq!(chunk.offset, cursor, "chunks are contiguous");
            assert!(chunk.len.is_power_of_two());
            assert!(chunk.len <= c);
            assert_eq!(chunk.unit, expected_unit);
            cursor = chunk.end();
            expected_unit += 1;
        }
        assert_eq!(cursor, layer.input_size, "chunks cover the layer");
        // Only the last chunk may be short.
        let short = layer.chunks.iter().filter(|ch| ch.len != c).count();
        assert!(short <= 1);
        if short == 1 {
            assert_ne!(layer.chunks.last().map(|ch| ch.len), Some(c));
        }
        expected_input = layer.output_size();
    }

    let t = p.terminal();
    assert_eq!(t.index as usize, p.layers().len());
    assert_eq!(t.input_size, expected_input);
    assert!(t.input_size <= c);
    assert_eq!(t.chunks.len(), 1);
    assert_eq!(t.chunks[0].offset, 0);
    assert_eq!(t.chunks[0].len, t.input_size);
    assert_eq!(t.chunks[0].unit, expected_unit);
    assert_eq!(p.unit_count(), expected_unit as usize);
}

proptest! {
    #[test]
    fn small_power_of_two_trees_need_one_unit(n_log in 0u32..12, extra in 0u32..4) {
        let n = 1usize << n_log;
        let c = n << extra;
        let p = plan(n, c).unwrap();
        prop_assert!(p.layers().is_empty());
        prop_assert_eq!(p.terminal().input_size, n);
        prop_assert_eq!(p.total_units(), 1);
    }

    #[test]
    fn power_of_two_shapes_match_layer_count(n_log in 0u32..16, c_log in 1u32..8) {
        let (n, c) = (1usize << n_log, 1usize << c_log);
        let p = plan(n, c).unwrap();
        prop_assert_eq!(Some(p.layer_count()), expected_layer_count(n, c));
        assert_well_formed(&p);
    }

    #[test]
    fn arbitrary_shapes_are_well_formed_or_unaligned(n in 1usize..5000, c in 2usize..70) {
        match plan(n, c) {
            Ok(p) => {
                prop_assert_eq!(Some(p.layer_count()), expected_layer_count(n, c));
                assert_well_formed(&p);
            }
            Err(TreeError::UnalignedChunk { len, .. }) => {
                prop_assert!(!len.is_power_of_two());
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    #[test]
    fn zero_capacity_always_fails_first(n in 0usize..10_000) {
        prop_assert_eq!(plan(n, 0), Err(TreeError::InvalidCapacity { capacity: 0 }));
    }

    #[test]
    fn zero_leaves_always_fail(c in 1usize..10_000) {
        prop_assert_eq!(plan(0, c), Err(TreeError::InvalidSize { leaves: 0 }));
    }
}
