//! Plan descriptors shared across the mpmerkle workspace.
//!
//! A [`Plan`] is pure metadata: for one `(leaf_count, capacity)` pair it lists
//! every non-terminal layer with its chunk boundaries and unit ids, plus the
//! terminal layer whose single chunk yields the root. It does not depend on
//! leaf values and can be reused for any leaf sequence of the same length.
//!
//! The serialized form is the contract handed to task emitters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Identifier of the execution unit (prover) that reduces one chunk.
///
/// Assigned sequentially in planning order (layer-major, chunk-minor).
pub type UnitId = u32;

/// Number of children merged by one combiner call.
pub const ARITY: usize = 2;

/// Contiguous sub-range `[offset, offset + len)` of one layer's input.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChunkDesc {
    /// First index of the chunk within the layer input.
    pub offset: usize,
    /// Number of elements (a power of two in valid plans).
    pub len: usize,
    /// Unit responsible for reducing this chunk.
    pub unit: UnitId,
}

impl ChunkDesc {
    /// Create a chunk descriptor (no validation).
    #[inline]
    #[must_use]
    pub const fn new(offset: usize, len: usize, unit: UnitId) -> Self {
        Self { offset, len, unit }
    }

    /// Exclusive end index.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Index range covered by the chunk.
    #[inline]
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// One layer of the schedule: how layer `index` is sliced into chunks.
///
/// Reducing every chunk produces layer `index + 1`, whose length is
/// `chunks.len()`; element `j` of that output belongs to `chunks[j]`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerPlan {
    /// Index of the layer being read (0 = leaves).
    pub index: u32,
    /// Number of values in the layer being read.
    pub input_size: usize,
    /// Chunks in ascending offset (and unit id) order.
    pub chunks: Vec<ChunkDesc>,
}

impl LayerPlan {
    /// Length of the layer produced from this one.
    #[inline]
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.chunks.len()
    }
}

/// Complete partition schedule for one `(leaf_count, capacity)` pair.
///
/// Immutable once produced; build it with the planner in
/// `mpmerkle-scheduler` or load one written by it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    leaf_count: usize,
    capacity: usize,
    layers: Vec<LayerPlan>,
    terminal: LayerPlan,
}

impl Plan {
    /// Assemble a plan from already-validated parts.
    ///
    /// No checks are performed here; consumers that execute a plan validate
    /// each layer's tiling before reducing it.
    #[must_use]
    pub fn from_parts(
        leaf_count: usize,
        capacity: usize,
        layers: Vec<LayerPlan>,
        terminal: LayerPlan,
    ) -> Self {
        Self {
            leaf_count,
            capacity,
            layers,
            terminal,
        }
    }

    /// Number of leaves (N) the plan was built for.
    #[inline]
    #[must_use]
    pub const fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Per-unit capacity (C) the plan was built for.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Combiner arity assumed by the schedule.
    #[inline]
    #[must_use]
    pub const fn arity(&self) -> usize {
        ARITY
    }

    /// Non-terminal layers in execution order.
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[LayerPlan] {
        &self.layers
    }

    /// Terminal layer (exactly one chunk, reduced by one unit to the root).
    #[inline]
    #[must_use]
    pub const fn terminal(&self) -> &LayerPlan {
        &self.terminal
    }

    /// Total number of layers including the terminal one.
    #[inline]
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len() + 1
    }

    /// Number of units across all non-terminal layers.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.layers.iter().map(|l| l.chunks.len()).sum()
    }

    /// Number of units including the terminal unit.
    #[inline]
    #[must_use]
    pub fn total_units(&self) -> usize {
        self.unit_count() + 1
    }

    /// Iterate all layers (non-terminal, then terminal).
    pub fn all_layers(&self) -> impl Iterator<Item = &LayerPlan> + '_ {
        self.layers.iter().chain(std::iter::once(&self.terminal))
    }

    /// Find the chunk owned by `unit`, together with its layer.
    #[must_use]
    pub fn chunk_for_unit(&self, unit: UnitId) -> Option<(&LayerPlan, &ChunkDesc)> {
        self.all_layers().find_map(|layer| {
            // Unit ids are ascending within a layer.
            let first = layer.chunks.first()?.unit;
            let pos = unit.checked_sub(first)? as usize;
            layer
                .chunks
                .get(pos)
                .filter(|c| c.unit == unit)
                .map(|c| (layer, c))
        })
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "leaves={} capacity={} layers={} units={}",
            self.leaf_count,
            self.capacity,
            self.layer_count(),
            self.total_units()
        )?;
        for l in &self.layers {
            writeln!(
                f,
                "  layer {}: {} values -> {} chunks (units {}..={})",
                l.index,
                l.input_size,
                l.chunks.len(),
                l.chunks.first().map_or(0, |c| c.unit),
                l.chunks.last().map_or(0, |c| c.unit),
            )?;
        }
        write!(
            f,
            "  terminal {}: {} values -> root (unit {})",
            self.terminal.index,
            self.terminal.input_size,
            self.terminal.chunks.first().map_or(0, |c| c.unit)
        )
    }
}
