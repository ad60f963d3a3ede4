//! Run configuration consumed by the planner and driver.
//!
//! The surface is small: total leaf count `N`, per-unit
//! capacity `C`, and an optional expected root. Configs serialize with serde
//! so they can be kept next to generated plans (see [`crate::io`]).

use crate::error::{TreeError, TreeResult};
use serde::{Deserialize, Serialize};

/// Default number of leaves used by tooling when none is given.
pub const DEFAULT_LEAVES: usize = 1024;

/// Default per-prover capacity used by tooling when none is given.
pub const DEFAULT_CAPACITY: usize = 16;

/// Shape and expectation for one root computation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeConfig<T> {
    /// Total leaf count `N`.
    pub leaf_count: usize,
    /// Maximum number of values one unit reduces directly (`C`).
    pub per_unit_capacity: usize,
    /// Root to compare against, if any.
    pub expected_root: Option<T>,
}

impl<T> TreeConfig<T> {
    /// Config without an expected root.
    #[must_use]
    pub const fn new(leaf_count: usize, per_unit_capacity: usize) -> Self {
        Self {
            leaf_count,
            per_unit_capacity,
            expected_root: None,
        }
    }

    /// Attach an expected root.
    #[must_use]
    pub fn with_expected_root(mut self, root: T) -> Self {
        self.expected_root = Some(root);
        self
    }

    /// Check the shape without building a plan.
    pub fn validate(&self) -> TreeResult<()> {
        check_shape(self.leaf_count, self.per_unit_capacity)
    }
}

impl<T> Default for TreeConfig<T> {
    fn default() -> Self {
        Self::new(DEFAULT_LEAVES, DEFAULT_CAPACITY)
    }
}

/// Capacity and size checks shared by config validation and planning.
///
/// Capacity is checked first, so `(0, 0)` reports `InvalidCapacity`.
pub fn check_shape(leaf_count: usize, capacity: usize) -> TreeResult<()> {
    if capacity == 0 {
        return Err(TreeError::InvalidCapacity { capacity });
    }
    if leaf_count == 0 {
        return Err(TreeError::InvalidSize { leaves: leaf_count });
    }
    if capacity == 1 && leaf_count > 1 {
        return Err(TreeError::InvalidCapacity { capacity });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_shape() {
        let c: TreeConfig<u64> = TreeConfig::default();
        assert_eq!(c.leaf_count, 1024);
        assert_eq!(c.per_unit_capacity, 16);
        assert!(c.expected_root.is_none());
        c.validate().unwrap();
    }

    #[test]
    fn capacity_error_wins_over_size_error() {
        assert_eq!(
            check_shape(0, 0),
            Err(TreeError::InvalidCapacity { capacity: 0 })
        );
        assert_eq!(check_shape(0, 4), Err(TreeError::InvalidSize { leaves: 0 }));
    }

    #[test]
    fn capacity_one_only_fits_a_single_leaf() {
        check_shape(1, 1).unwrap();
        assert_eq!(
            check_shape(2, 1),
            Err(TreeError::InvalidCapacity { capacity: 1 })
        );
    }

    #[test]
    fn expected_root_defaults_when_missing_from_json() {
        let c: TreeConfig<u64> =
            serde_json::from_str(r#"{"leaf_count":8,"per_unit_capacity":4}"#).unwrap();
        assert_eq!(c, TreeConfig::new(8, 4));
        let c = c.with_expected_root(8);
        assert_eq!(c.expected_root, Some(8));
    }
}
