// crates/mpmerkle-scheduler/src/planner.rs

//! Capacity-bounded partition planner.
//!
//! Starting from `size = N`, every layer whose size exceeds the capacity `C`
//! is sliced into `ceil(size / C)` contiguous chunks: all of length `C`
//! except the last, which holds `size mod C` (or `C` when it divides evenly).
//! The next layer has one value per chunk. Once `size <= C`, a single
//! terminal chunk covers the whole layer and is reduced by one unit, even if
//! it could be split further.
//!
//! Every chunk must have a power-of-two length, since the pairwise reducer is
//! only defined on such inputs. Unit ids are handed out sequentially in
//! discovery order (layer-major, chunk-minor); the terminal unit takes the
//! next id after all non-terminal units.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use mpmerkle_core::{check_shape, ChunkDesc, LayerPlan, Plan, TreeError, TreeResult, UnitId};

/// Build the full layer schedule for `leaf_count` leaves and per-unit
/// `capacity`.
///
/// Deterministic: equal inputs always yield equal plans.
///
/// # Errors
/// - [`TreeError::InvalidCapacity`] if `capacity == 0` (or `capacity == 1`
///   with more than one leaf).
/// - [`TreeError::InvalidSize`] if `leaf_count == 0`, or if the unit count
///   would not fit in a [`UnitId`].
/// - [`TreeError::UnalignedChunk`] if any chunk length (full, remainder or
///   terminal) is not a power of two.
pub fn plan(leaf_count: usize, capacity: usize) -> TreeResult<Plan> {
    check_shape(leaf_count, capacity)?;

    let mut layers = Vec::new();
    let mut next_unit: UnitId = 0;
    let mut size = leaf_count;
    let mut index: u32 = 0;

    while size > capacity {
        let n_chunks = size.div_ceil(capacity);
        let rem = size % capacity;

        // Remainder first: it is the chunk most likely to be misaligned.
        if rem != 0 && !rem.is_power_of_two() {
            return Err(TreeError::UnalignedChunk {
                layer: index,
                offset: size - rem,
                len: rem,
            });
        }
        if !capacity.is_power_of_two() {
            return Err(TreeError::UnalignedChunk {
                layer: index,
                offset: 0,
                len: capacity,
            });
        }

        let mut chunks = Vec::with_capacity(n_chunks);
        for j in 0..n_chunks {
            let offset = j * capacity;
            let len = capacity.min(size - offset);
            chunks.push(ChunkDesc::new(offset, len, next_unit));
            next_unit = next_unit
                .checked_add(1)
                .ok_or(TreeError::InvalidSize { leaves: leaf_count })?;
        }

        layers.push(LayerPlan {
            index,
            input_size: size,
            chunks,
        });
        size = n_chunks;
        index += 1;
    }

    if !size.is_power_of_two() {
        return Err(TreeError::UnalignedChunk {
            layer: index,
            offset: 0,
            len: size,
        });
    }

    let terminal = LayerPlan {
        index,
        input_size: size,
        chunks: vec![ChunkDesc::new(0, size, next_unit)],
    };

    Ok(Plan::from_parts(leaf_count, capacity, layers, terminal))
}
