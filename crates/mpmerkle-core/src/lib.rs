//! mpmerkle-core: shared data model for multi-prover Merkle reduction.
//!
//! This crate defines the **stable boundary** used across mpmerkle crates:
//! - the opaque binary [`Combiner`] and a wrapping-sum mock,
//! - the read-only [`Plan`] (layers, chunks, unit ids) handed to task emitters,
//! - the [`TreeError`] taxonomy shared by the planner, reducer and driver,
//! - [`TreeConfig`] and JSON/CBOR I/O with extension auto-detection.
//!
//! ```no_run
//! use mpmerkle_core::{Combiner, SumCombiner, TreeConfig};
//! let cfg: TreeConfig<u64> = TreeConfig::new(1024, 16);
//! cfg.validate()?;
//! assert_eq!(SumCombiner.combine(&2, &3), 5);
//! # Ok::<(), mpmerkle_core::TreeError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Opaque binary combiner trait and the wrapping-sum mock.
pub mod combiner;
/// Run configuration (leaf count, capacity, optional expected root).
pub mod config;
/// Error taxonomy for planning, reduction and composition.
pub mod error;
/// JSON/CBOR helpers and auto-detecting read/write APIs.
pub mod io;
/// Plan descriptors: layers, chunks and unit ids.
pub mod types;

// ---- Re-exports for workspace compatibility ----
pub use combiner::*;
pub use config::*;
pub use error::*;
pub use types::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use mpmerkle_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        combiner::{Combiner, SumCombiner},
        config::TreeConfig,
        error::{TreeError, TreeResult},
        types::*,
    };
}
