// crates/mpmerkle-merkle/src/reduce.rs

//! In-place pairwise reduction of one power-of-two chunk.
//!
//! Pass `k` (stride `s = 2^k`) merges `v[i] = combine(v[i], v[i + s])` for
//! every `i` that is a multiple of `2s`. The index groups `[i, i + 2s)` of a
//! pass are disjoint, so a pass may run its groups in any order (or in
//! parallel); passes themselves are strictly sequential. After `log2(len)`
//! passes the root sits at index 0.
//!
//! The chunk slice is the only storage touched.

use mpmerkle_core::{Combiner, TreeError, TreeResult};

/// Reduce `chunk` to one value, or fail with
/// [`TreeError::InvalidChunkLength`] if its length is zero or not a power
/// of two.
pub fn try_reduce<C: Combiner + ?Sized>(combiner: &C, chunk: &mut [C::Value]) -> TreeResult<C::Value> {
    let len = check_len(chunk.len())?;
    let mut stride = 1usize;
    while stride < len {
        for group in chunk.chunks_exact_mut(2 * stride) {
            merge_group(combiner, group, stride);
        }
        stride *= 2;
    }
    Ok(chunk[0].clone())
}

/// Reduce `chunk` to one value.
///
/// # Panics
/// Panics if the chunk length is zero or not a power of two; a planner-built
/// chunk never is. Prefer [`try_reduce`] for unchecked inputs.
#[must_use]
pub fn reduce<C: Combiner + ?Sized>(combiner: &C, chunk: &mut [C::Value]) -> C::Value {
    try_reduce(combiner, chunk).unwrap_or_else(|e| panic!("pairwise reduce: {e}"))
}

/// Parallel [`try_reduce`]: groups of one pass run on the rayon pool.
///
/// Produces exactly the same value as the sequential form.
#[cfg(feature = "parallel")]
pub fn try_reduce_par<C>(combiner: &C, chunk: &mut [C::Value]) -> TreeResult<C::Value>
where
    C: Combiner + Sync + ?Sized,
    C::Value: Send,
{
    use rayon::prelude::*;

    // Below this many groups a pass is not worth splitting.
    const MIN_GROUPS_PER_TASK: usize = 64;

    let len = check_len(chunk.len())?;
    let mut stride = 1usize;
    while stride < len {
        chunk
            .par_chunks_exact_mut(2 * stride)
            .with_min_len(MIN_GROUPS_PER_TASK)
            .for_each(|group| merge_group(combiner, group, stride));
        stride *= 2;
    }
    Ok(chunk[0].clone())
}

#[inline]
fn merge_group<C: Combiner + ?Sized>(combiner: &C, group: &mut [C::Value], stride: usize) {
    group[0] = combiner.combine(&group[0], &group[stride]);
}

#[inline]
fn check_len(len: usize) -> TreeResult<usize> {
    if len.is_power_of_two() {
        Ok(len)
    } else {
        Err(TreeError::InvalidChunkLength { len })
    }
}
