// crates/mpmerkle-scheduler/src/lib.rs

//! Multi-layer partition planning for distributed Merkle reduction.
//!
//! - [`plan`] slices `N` leaves into power-of-two chunks of at most `C`
//!   values, layer by layer, until one unit can finish the job.
//! - [`PlanCache`] memoizes plans by shape so repeated runs skip planning.
//! - [`bounds`] has tiny shape helpers (merge passes, layer counts).
//!
//! The produced [`mpmerkle_core::Plan`] is read-only metadata: the driver in
//! `mpmerkle-merkle` executes it, task emitters turn its chunks into units.

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

/// Shape helpers for power-of-two schedules.
pub mod bounds;
/// Shape-keyed plan cache.
pub mod cache;
/// Capacity-bounded partition planner.
pub mod planner;

pub use bounds::{ceil_log2, expected_layer_count};
pub use cache::PlanCache;
pub use planner::plan;
