//! Error taxonomy shared by the planner, reducer and driver.
//!
//! All variants are structural: they are detected before any reduction work
//! starts (or, for [`TreeError::InvalidChunkLength`], flag a caller bug) and
//! are fatal to the current invocation. A root that differs from the expected
//! one is **not** an error; see the driver's outcome type.

use thiserror::Error;

/// Structural failure of a planning or reduction request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Per-unit capacity is zero, or is one while more than one leaf exists
    /// (no layer could ever shrink).
    #[error("invalid per-unit capacity {capacity} (need >= 1, and >= 2 for more than one leaf)")]
    InvalidCapacity {
        /// Offending capacity.
        capacity: usize,
    },

    /// Leaf sequence is empty.
    #[error("invalid leaf count {leaves} (need at least one leaf)")]
    InvalidSize {
        /// Offending leaf count.
        leaves: usize,
    },

    /// A planned chunk length is not a power of two.
    #[error("unaligned chunk in layer {layer}: offset {offset}, length {len} is not a power of two")]
    UnalignedChunk {
        /// Index of the layer being partitioned (0 = leaves).
        layer: u32,
        /// Chunk start within that layer.
        offset: usize,
        /// Chunk length.
        len: usize,
    },

    /// Reducer invoked on an empty or non-power-of-two chunk.
    #[error("invalid chunk length {len} (reducer needs a non-zero power of two)")]
    InvalidChunkLength {
        /// Offending length.
        len: usize,
    },

    /// Driver was handed a plan built for a different leaf count.
    #[error("leaf count mismatch: plan expects {expected}, got {got}")]
    LeafCountMismatch {
        /// Leaf count the plan was built for.
        expected: usize,
        /// Leaf count actually supplied.
        got: usize,
    },

    /// Chunk descriptors do not tile the layer input contiguously.
    #[error("malformed layer {layer}: {reason}")]
    MalformedLayer {
        /// Index of the layer being composed.
        layer: u32,
        /// Human-readable description.
        reason: String,
    },
}

/// Convenience alias used across the workspace.
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let e = TreeError::UnalignedChunk {
            layer: 0,
            offset: 15,
            len: 5,
        };
        let s = e.to_string();
        assert!(s.contains("offset 15"), "{s}");
        assert!(s.contains("length 5"), "{s}");

        let e = TreeError::InvalidCapacity { capacity: 0 };
        assert!(e.to_string().contains("capacity 0"));
    }

    #[test]
    fn converts_into_anyhow() {
        let e: anyhow::Error = TreeError::InvalidSize { leaves: 0 }.into();
        assert!(e.downcast_ref::<TreeError>().is_some());
    }
}
