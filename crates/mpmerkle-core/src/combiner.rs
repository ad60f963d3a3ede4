// crates/mpmerkle-core/src/combiner.rs

//! Opaque binary combiner.
//!
//! A [`Combiner`] merges two adjacent values of one reduction layer into the
//! value of their parent. The reduction scheme never looks inside the values;
//! it only relies on `combine` being **deterministic**.
//!
//! ## Invariants
//! - `combine(a, b)` depends only on `a` and `b` (no hidden state that changes
//!   between calls).
//! - Argument order is significant: `left` is always the lower index.

use std::fmt::Debug;

/// A deterministic binary combiner (hash, field addition, …).
pub trait Combiner {
    /// Value type flowing through every layer (integer, field element, digest).
    type Value: Clone + PartialEq + Debug;

    /// Merge the left and right child values into their parent value.
    #[must_use]
    fn combine(&self, left: &Self::Value, right: &Self::Value) -> Self::Value;
}

impl<C: Combiner + ?Sized> Combiner for &C {
    type Value = C::Value;

    #[inline]
    fn combine(&self, left: &Self::Value, right: &Self::Value) -> Self::Value {
        (**self).combine(left, right)
    }
}

/// Mock combiner over `u64`: `combine(a, b) = a + b` (wrapping).
///
/// With all leaves equal to `1`, the root equals the leaf count, which makes
/// it the usual smoke-test combiner for layer bookkeeping.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumCombiner;

impl SumCombiner {
    /// Construct a new [`SumCombiner`].
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Combiner for SumCombiner {
    type Value = u64;

    #[inline]
    fn combine(&self, left: &u64, right: &u64) -> u64 {
        left.wrapping_add(*right)
    }
}
