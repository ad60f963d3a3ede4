//! Root driver: plan, compose layer by layer, finish with one unit.
//!
//! For a leaf sequence and per-unit capacity the driver:
//! 1) **Plans** the layer schedule (failures return before any reduction).
//! 2) **Composes** each non-terminal layer in order; layer `k + 1` starts
//!    only after layer `k` is fully materialized.
//! 3) **Reduces** the terminal chunk to the root and, if asked, compares it
//!    with an expected root.
//!
//! Each invocation owns its layer buffers: layer 0 is a copy of the caller's
//! leaves, and every layer is dropped as soon as the next one exists.
//!
//! A root that differs from the expected one is reported through
//! [`RootOutcome::matched`], not as an error.

use crate::compose::{compose_layer, compose_layer_with, split_chunks};
use crate::reduce::try_reduce;
use mpmerkle_core::{ChunkDesc, Combiner, LayerPlan, Plan, TreeConfig, TreeError, TreeResult};
use mpmerkle_scheduler::{ceil_log2, plan};
use std::fmt;
use tracing::{debug, info, warn};

/// Result of one root computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootOutcome<T> {
    /// Computed root.
    pub root: T,
    /// `Some(root == expected)` when an expected root was supplied.
    pub matched: Option<bool>,
}

impl<T> RootOutcome<T> {
    /// `true` only when an expected root was supplied and matched.
    #[inline]
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.matched == Some(true)
    }
}

/// Driver progress, as reported in trace events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Building (or checking) the plan.
    Planning,
    /// Producing layer `k` (1-based) from layer `k - 1`.
    LayerReducing(u32),
    /// Reducing the terminal chunk to the root.
    FinalReduce,
    /// Root computed.
    Done,
    /// Structural failure; no partial result.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planning => f.write_str("planning"),
            Self::LayerReducing(k) => write!(f, "layer-reducing({k})"),
            Self::FinalReduce => f.write_str("final-reduce"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Multi-layer root driver over one combiner.
#[derive(Clone, Debug, Default)]
pub struct TreeDriver<C> {
    combiner: C,
}

impl<C: Combiner> TreeDriver<C> {
    /// Driver using `combiner` for every merge.
    #[must_use]
    pub const fn new(combiner: C) -> Self {
        Self { combiner }
    }

    /// Borrow the combiner.
    #[must_use]
    pub const fn combiner(&self) -> &C {
        &self.combiner
    }

    /// Plan for `leaves.len()` and `capacity`, then compute the root.
    ///
    /// Planning errors are returned unchanged before any layer work starts.
    pub fn compute_root(
        &self,
        leaves: &[C::Value],
        capacity: usize,
        expected: Option<&C::Value>,
    ) -> TreeResult<RootOutcome<C::Value>> {
        let plan = plan_or_fail(leaves.len(), capacity)?;
        self.compute_root_with_plan(&plan, leaves, expected)
    }

    /// Compute the root using a (possibly cached) plan for `leaves.len()`.
    pub fn compute_root_with_plan(
        &self,
        plan: &Plan,
        leaves: &[C::Value],
        expected: Option<&C::Value>,
    ) -> TreeResult<RootOutcome<C::Value>> {
        drive(
            plan,
            leaves,
            expected,
            |input, layer| compose_layer(&self.combiner, input, layer),
            |_, slice| try_reduce(&self.combiner, slice),
        )
    }

    /// Compute the root for a [`TreeConfig`]; its leaf count must match.
    pub fn compute_root_for(
        &self,
        config: &TreeConfig<C::Value>,
        leaves: &[C::Value],
    ) -> TreeResult<RootOutcome<C::Value>> {
        config.validate()?;
        if config.leaf_count != leaves.len() {
            return Err(TreeError::LeafCountMismatch {
                expected: config.leaf_count,
                got: leaves.len(),
            });
        }
        self.compute_root(leaves, config.per_unit_capacity, config.expected_root.as_ref())
    }
}

#[cfg(feature = "parallel")]
impl<C> TreeDriver<C>
where
    C: Combiner + Sync,
    C::Value: Send,
{
    /// [`Self::compute_root`] with chunks of each layer reduced on the rayon
    /// pool. The layer barrier is unchanged; the root is identical.
    pub fn compute_root_par(
        &self,
        leaves: &[C::Value],
        capacity: usize,
        expected: Option<&C::Value>,
    ) -> TreeResult<RootOutcome<C::Value>> {
        let plan = plan_or_fail(leaves.len(), capacity)?;
        self.compute_root_with_plan_par(&plan, leaves, expected)
    }

    /// [`Self::compute_root_with_plan`] on the rayon pool.
    pub fn compute_root_with_plan_par(
        &self,
        plan: &Plan,
        leaves: &[C::Value],
        expected: Option<&C::Value>,
    ) -> TreeResult<RootOutcome<C::Value>> {
        use crate::compose::compose_layer_par;
        use crate::reduce::try_reduce_par;

        drive(
            plan,
            leaves,
            expected,
            |input, layer| compose_layer_par(&self.combiner, input, layer),
            |_, slice| try_reduce_par(&self.combiner, slice),
        )
    }
}

/// Compute the root by handing every unit (terminal included) to an external
/// executor.
///
/// `run_unit` gets each chunk descriptor and its slice, layer by layer; a
/// unit error aborts the computation before the layer is published, so a
/// dispatcher that wants fault tolerance must retry the unit inside
/// `run_unit`. `expected` is compared with `PartialEq`.
pub fn compute_root_dispatch<T, E, F>(
    plan: &Plan,
    leaves: &[T],
    expected: Option<&T>,
    mut run_unit: F,
) -> Result<RootOutcome<T>, E>
where
    T: Clone + PartialEq + fmt::Debug,
    E: From<TreeError>,
    F: FnMut(&ChunkDesc, &mut [T]) -> Result<T, E>,
{
    drive_with(plan, leaves, expected, |step| match step {
        Step::Layer(input, layer) => {
            compose_layer_with(input, layer, &mut run_unit).map(StepOut::Layer)
        }
        Step::Terminal(chunk, slice) => run_unit(chunk, slice).map(StepOut::Root),
    })
}

/* -------------------- Shared layer loop -------------------- */

enum Step<'a, 'b, T> {
    Layer(&'a mut [T], &'b LayerPlan),
    Terminal(&'b ChunkDesc, &'a mut [T]),
}

enum StepOut<T> {
    Layer(Vec<T>),
    Root(T),
}

fn plan_or_fail(leaf_count: usize, capacity: usize) -> TreeResult<Plan> {
    debug!(phase = %Phase::Planning, leaf_count, capacity, "planning");
    plan(leaf_count, capacity)
}

fn drive<T, FL, FT>(
    plan: &Plan,
    leaves: &[T],
    expected: Option<&T>,
    mut compose: FL,
    mut finish: FT,
) -> TreeResult<RootOutcome<T>>
where
    T: Clone + PartialEq + fmt::Debug,
    FL: FnMut(&mut [T], &LayerPlan) -> TreeResult<Vec<T>>,
    FT: FnMut(&ChunkDesc, &mut [T]) -> TreeResult<T>,
{
    drive_with(plan, leaves, expected, |step| match step {
        Step::Layer(input, layer) => compose(input, layer).map(StepOut::Layer),
        Step::Terminal(chunk, slice) => finish(chunk, slice).map(StepOut::Root),
    })
}

fn drive_with<T, E, F>(
    plan: &Plan,
    leaves: &[T],
    expected: Option<&T>,
    mut step: F,
) -> Result<RootOutcome<T>, E>
where
    T: Clone + PartialEq + fmt::Debug,
    E: From<TreeError>,
    F: FnMut(Step<'_, '_, T>) -> Result<StepOut<T>, E>,
{
    if leaves.len() != plan.leaf_count() {
        debug!(phase = %Phase::Failed, "leaf count does not match plan");
        return Err(TreeError::LeafCountMismatch {
            expected: plan.leaf_count(),
            got: leaves.len(),
        }
        .into());
    }

    let mut current: Vec<T> = leaves.to_vec();
    for layer in plan.layers() {
        debug!(
            phase = %Phase::LayerReducing(layer.index + 1),
            input = layer.input_size,
            chunks = layer.chunks.len(),
            passes = ceil_log2(layer.chunks.first().map_or(0, |c| c.len)),
            "composing layer"
        );
        match step(Step::Layer(&mut current, layer))? {
            StepOut::Layer(next) => current = next,
            StepOut::Root(_) => unreachable!("layer step yields a layer"),
        }
    }

    let terminal = plan.terminal();
    debug!(
        phase = %Phase::FinalReduce,
        input = terminal.input_size,
        passes = ceil_log2(terminal.input_size),
        "reducing terminal chunk"
    );
    let mut slices = split_chunks(&mut current, terminal)?;
    let (Some(slice), Some(chunk), 1) = (slices.pop(), terminal.chunks.first(), terminal.chunks.len()) else {
        return Err(TreeError::MalformedLayer {
            layer: terminal.index,
            reason: format!("terminal layer has {} chunks, expected 1", terminal.chunks.len()),
        }
        .into());
    };
    let root = match step(Step::Terminal(chunk, slice))? {
        StepOut::Root(r) => r,
        StepOut::Layer(_) => unreachable!("terminal step yields a root"),
    };

    let matched = expected.map(|e| *e == root);
    match matched {
        Some(false) => warn!(phase = %Phase::Done, ?root, ?expected, "root mismatch"),
        _ => info!(phase = %Phase::Done, ?root, ?matched, layers = plan.layer_count(), "root computed"),
    }
    Ok(RootOutcome { root, matched })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpmerkle_core::SumCombiner;

    #[test]
    fn reference_scenario_with_expected_root() {
        let d = TreeDriver::new(SumCombiner);
        let leaves = vec![1u64; 1024];

        let ok = d.compute_root(&leaves, 16, Some(&1024)).unwrap();
        assert_eq!(ok, RootOutcome { root: 1024, matched: Some(true) });
        assert!(ok.is_match());

        let bad = d.compute_root(&leaves, 16, Some(&0)).unwrap();
        assert_eq!(bad.root, 1024);
        assert_eq!(bad.matched, Some(false));

        let none = d.compute_root(&leaves, 16, None).unwrap();
        assert_eq!(none.matched, None);
        assert!(!none.is_match());
    }

    #[test]
    fn planning_errors_propagate_unchanged() {
        let d = TreeDriver::new(SumCombiner);
        assert_eq!(
            d.compute_root(&[1u64; 20], 15, None),
            Err(TreeError::UnalignedChunk { layer: 0, offset: 15, len: 5 })
        );
        assert_eq!(
            d.compute_root(&[], 16, None),
            Err(TreeError::InvalidSize { leaves: 0 })
        );
        assert_eq!(
            d.compute_root(&[1u64], 0, None),
            Err(TreeError::InvalidCapacity { capacity: 0 })
        );
    }

    #[test]
    fn plan_for_other_size_is_rejected() {
        let d = TreeDriver::new(SumCombiner);
        let p = plan(64, 16).unwrap();
        assert_eq!(
            d.compute_root_with_plan(&p, &[1u64; 32], None),
            Err(TreeError::LeafCountMismatch { expected: 64, got: 32 })
        );
    }

    #[test]
    fn caller_leaves_are_not_mutated() {
        let d = TreeDriver::new(SumCombiner);
        let leaves: Vec<u64> = (0..64).collect();
        let before = leaves.clone();
        let out = d.compute_root(&leaves, 8, None).unwrap();
        assert_eq!(out.root, 63 * 64 / 2);
        assert_eq!(leaves, before);
    }

    #[test]
    fn config_driven_run() {
        let d = TreeDriver::new(SumCombiner);
        let cfg = TreeConfig::new(20, 16).with_expected_root(20u64);
        assert!(d.compute_root_for(&cfg, &[1u64; 20]).unwrap().is_match());
        assert_eq!(
            d.compute_root_for(&cfg, &[1u64; 16]),
            Err(TreeError::LeafCountMismatch { expected: 20, got: 16 })
        );
    }

    #[test]
    fn dispatch_runs_every_unit_once() {
        let p = plan(1024, 16).unwrap();
        let mut units = Vec::new();
        let out = compute_root_dispatch::<_, TreeError, _>(&p, &[1u64; 1024], Some(&1024), |c, s| {
            units.push(c.unit);
            try_reduce(&SumCombiner, s)
        })
        .unwrap();
        assert!(out.is_match());
        let expected: Vec<u32> = (0..p.total_units() as u32).collect();
        assert_eq!(units, expected);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_root_matches_sequential() {
        use crate::hash::{leaf_digest, Blake3Combiner};

        let leaves: Vec<_> = (0..4096u64).map(leaf_digest).collect();
        let d = TreeDriver::new(Blake3Combiner);
        let seq = d.compute_root(&leaves, 16, None).unwrap();
        let par = d.compute_root_par(&leaves, 16, Some(&seq.root)).unwrap();
        assert_eq!(par.root, seq.root);
        assert!(par.is_match());

        let p = plan(4096, 16).unwrap();
        let cached = d.compute_root_with_plan_par(&p, &leaves, None).unwrap();
        assert_eq!(cached.root, seq.root);

        assert_eq!(
            d.compute_root_par(&leaves[..20], 15, None),
            Err(TreeError::UnalignedChunk { layer: 0, offset: 15, len: 5 })
        );
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::LayerReducing(2).to_string(), "layer-reducing(2)");
        assert_eq!(Phase::FinalReduce.to_string(), "final-reduce");
    }
}
