// crates/mpmerkle-merkle/src/compose.rs

//! Layer composition: reduce every chunk of a layer, one output per chunk.
//!
//! Output element `j` always belongs to the layer's `j`-th chunk (its rank,
//! not its global unit id), whatever order the units actually run in. The
//! chunk slices are disjoint, so units may reduce them concurrently in place.
//!
//! Before any unit runs, the chunk descriptors are checked to tile the input
//! contiguously with ascending unit ids; a malformed layer fails with
//! [`TreeError::MalformedLayer`] and leaves the input untouched.

use crate::reduce::try_reduce;
use mpmerkle_core::{ChunkDesc, Combiner, LayerPlan, TreeError, TreeResult};

/// Reduce every chunk of `layer` within `input` and return the next layer.
pub fn compose_layer<C: Combiner + ?Sized>(
    combiner: &C,
    input: &mut [C::Value],
    layer: &LayerPlan,
) -> TreeResult<Vec<C::Value>> {
    compose_layer_with(input, layer, |_, slice| try_reduce(combiner, slice))
}

/// Run `run_unit` on every chunk of `layer` and collect one value per chunk.
///
/// This is the seam for external executors (provers, worker processes):
/// `run_unit` receives the chunk descriptor (with its unit id) and exclusive
/// access to the chunk's slice. The first unit error aborts the layer and is
/// returned as-is; no partial output is ever produced.
pub fn compose_layer_with<T, E, F>(input: &mut [T], layer: &LayerPlan, mut run_unit: F) -> Result<Vec<T>, E>
where
    E: From<TreeError>,
    F: FnMut(&ChunkDesc, &mut [T]) -> Result<T, E>,
{
    let slices = split_chunks(input, layer)?;
    let mut out = Vec::with_capacity(slices.len());
    for (chunk, slice) in layer.chunks.iter().zip(slices) {
        out.push(run_unit(chunk, slice)?);
    }
    Ok(out)
}

/// Parallel [`compose_layer`]: every chunk is a rayon task.
#[cfg(feature = "parallel")]
pub fn compose_layer_par<C>(
    combiner: &C,
    input: &mut [C::Value],
    layer: &LayerPlan,
) -> TreeResult<Vec<C::Value>>
where
    C: Combiner + Sync + ?Sized,
    C::Value: Send,
{
    use crate::reduce::try_reduce_par;
    use rayon::prelude::*;

    let slices = split_chunks(input, layer)?;
    // Indexed collect keeps rank order regardless of completion order.
    slices
        .into_par_iter()
        .map(|slice| try_reduce_par(combiner, slice))
        .collect()
}

/// Split `input` into one exclusive slice per chunk, in rank order.
pub(crate) fn split_chunks<'a, T>(input: &'a mut [T], layer: &LayerPlan) -> TreeResult<Vec<&'a mut [T]>> {
    let malformed = |reason: String| TreeError::MalformedLayer {
        layer: layer.index,
        reason,
    };

    if input.len() != layer.input_size {
        return Err(malformed(format!(
            "input holds {} values, plan expects {}",
            input.len(),
            layer.input_size
        )));
    }

    let mut rest = input;
    let mut cursor = 0usize;
    let mut prev_unit = None;
    let mut out = Vec::with_capacity(layer.chunks.len());

    for c in &layer.chunks {
        if c.offset != cursor {
            return Err(malformed(format!(
                "chunk of unit {} starts at {}, expected {}",
                c.unit, c.offset, cursor
            )));
        }
        if c.len > rest.len() {
            return Err(malformed(format!(
                "chunk of unit {} ends at {}, past layer end {}",
                c.unit,
                c.end(),
                layer.input_size
            )));
        }
        if prev_unit.is_some_and(|p| c.unit <= p) {
            return Err(malformed(format!("unit {} is out of order", c.unit)));
        }
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(c.len);
        out.push(head);
        rest = tail;
        cursor += c.len;
        prev_unit = Some(c.unit);
    }

    if !rest.is_empty() {
        return Err(malformed(format!(
            "{} trailing values not covered by any chunk",
            rest.len()
        )));
    }
    Ok(out)
}
