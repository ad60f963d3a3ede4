// crates/mpmerkle-merkle/src/lib.rs

//! Multi-prover Merkle reduction: chunk reducer, layer composer and driver.
//!
//! - [`reduce`]: in-place pairwise reduction of one power-of-two chunk.
//! - [`compose`]: run every chunk of a planned layer, one output per chunk.
//! - [`driver`]: plan, compose layer by layer, reduce the terminal chunk and
//!   compare with an expected root.
//! - [`hash`]: BLAKE3 combiner and domain-separated leaf digests.
//! - [`commit`]: root manifests over `u64` leaf files (JSON/CBOR).
//!
//! With the `parallel` feature, the `*_par` variants reduce chunks of a layer
//! on the rayon pool and return exactly the sequential root.

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

/// Root manifests and commit/verify helpers.
pub mod commit;
/// Layer composition over planned chunks.
pub mod compose;
/// Multi-layer root driver.
pub mod driver;
/// BLAKE3 combiner and leaf digests.
pub mod hash;
/// Pairwise in-place chunk reduction.
pub mod reduce;

pub use commit::{
    commit_leaves, commit_leaves_file, read_manifest_auto, validate_leaves_against_manifest,
    verify_leaves_file_against_manifest, write_manifest_auto, CombinerKind, RootManifest,
    MANIFEST_VERSION,
};
pub use compose::{compose_layer, compose_layer_with};
pub use driver::{compute_root_dispatch, Phase, RootOutcome, TreeDriver};
pub use hash::{leaf_digest, Blake3Combiner, Digest};
pub use reduce::{reduce, try_reduce};

#[cfg(feature = "parallel")]
pub use compose::compose_layer_par;
#[cfg(feature = "parallel")]
pub use reduce::try_reduce_par;
