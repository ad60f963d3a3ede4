// crates/mpmerkle-merkle/src/commit.rs

//! Root commitments over `u64` leaf files.
//!
//! - [`CombinerKind`] selects the sum mock or BLAKE3 digests (leaves are
//!   hashed with [`leaf_digest`] first).
//! - [`RootManifest`] records the shape and root so a leaf file can later be
//!   checked against it.
//! - Helpers to commit leaves from disk, verify a leaves file against a
//!   manifest, and read/write manifests (JSON/CBOR).

use crate::driver::{RootOutcome, TreeDriver};
use crate::hash::{leaf_digest, Blake3Combiner};
use anyhow::{anyhow, bail, Context, Result};
use mpmerkle_core::{io as core_io, SumCombiner, TreeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Format version for [`RootManifest`].
pub const MANIFEST_VERSION: u32 = 1;

/// Which combiner a root was computed with.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CombinerKind {
    /// Wrapping `u64` addition; root bytes are the big-endian sum.
    Sum,
    /// BLAKE3 Merkle parents over [`leaf_digest`] leaves.
    Blake3,
}

impl fmt::Display for CombinerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => f.write_str("sum"),
            Self::Blake3 => f.write_str("blake3"),
        }
    }
}

impl CombinerKind {
    /// Compute the root of `leaves` as canonical bytes, comparing with
    /// `expected` when given.
    pub fn evaluate(
        self,
        leaves: &[u64],
        capacity: usize,
        expected: Option<&[u8]>,
    ) -> TreeResult<RootOutcome<Vec<u8>>> {
        let outcome = match self {
            Self::Sum => {
                let out = TreeDriver::new(SumCombiner).compute_root(leaves, capacity, None)?;
                out.root.to_be_bytes().to_vec()
            }
            Self::Blake3 => {
                let digests: Vec<_> = leaves.iter().copied().map(leaf_digest).collect();
                let out = TreeDriver::new(Blake3Combiner).compute_root(&digests, capacity, None)?;
                out.root.to_vec()
            }
        };
        let matched = expected.map(|e| e == outcome.as_slice());
        Ok(RootOutcome {
            root: outcome,
            matched,
        })
    }

    /// Parse a user-supplied root: decimal for `sum`, 64 hex chars for `blake3`.
    pub fn parse_root(self, s: &str) -> Result<Vec<u8>> {
        match self {
            Self::Sum => {
                let v: u64 = s
                    .trim()
                    .parse()
                    .with_context(|| format!("parse sum root {s:?} as u64"))?;
                Ok(v.to_be_bytes().to_vec())
            }
            Self::Blake3 => {
                let bytes = hex::decode(s.trim()).with_context(|| format!("parse hex root {s:?}"))?;
                if bytes.len() != 32 {
                    bail!("blake3 root must be 32 bytes, got {}", bytes.len());
                }
                Ok(bytes)
            }
        }
    }

    /// Render root bytes the way [`Self::parse_root`] reads them.
    #[must_use]
    pub fn format_root(self, bytes: &[u8]) -> String {
        match (self, <[u8; 8]>::try_from(bytes)) {
            (Self::Sum, Ok(be)) => u64::from_be_bytes(be).to_string(),
            _ => hex::encode(bytes),
        }
    }
}

/// Compact commitment over a `u64` leaf sequence.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootManifest {
    /// Schema/encoding version.
    pub version: u32,
    /// Combiner the root was computed with.
    pub combiner: CombinerKind,
    /// Number of leaves.
    pub leaf_count: u64,
    /// Per-unit capacity used for the plan.
    pub capacity: u64,
    /// Root bytes, hex encoded.
    pub root: String,
}

/// Compute a manifest from in-memory leaves.
pub fn commit_leaves(kind: CombinerKind, leaves: &[u64], capacity: usize) -> Result<RootManifest> {
    let out = kind
        .evaluate(leaves, capacity, None)
        .with_context(|| format!("computing {kind} root"))?;
    Ok(RootManifest {
        version: MANIFEST_VERSION,
        combiner: kind,
        leaf_count: leaves.len() as u64,
        capacity: capacity as u64,
        root: hex::encode(out.root),
    })
}

/// In-memory validator: recompute and compare leaf count and root.
pub fn validate_leaves_against_manifest(leaves: &[u64], man: &RootManifest) -> Result<()> {
    if man.version != MANIFEST_VERSION {
        bail!(
            "manifest version mismatch: expected {}, got {}",
            MANIFEST_VERSION,
            man.version
        );
    }
    if leaves.len() as u64 != man.leaf_count {
        bail!(
            "leaf count mismatch: manifest={}, recomputed={}",
            man.leaf_count,
            leaves.len()
        );
    }
    let capacity = usize::try_from(man.capacity)
        .map_err(|_| anyhow!("manifest capacity {} does not fit usize", man.capacity))?;
    let expected = hex::decode(&man.root).context("decode manifest root")?;
    let out = man
        .combiner
        .evaluate(leaves, capacity, Some(expected.as_slice()))
        .context("recomputing root")?;
    if !out.is_match() {
        bail!(
            "root mismatch: manifest={}, recomputed={}",
            man.root,
            hex::encode(&out.root)
        );
    }
    Ok(())
}

/// Read leaves (JSON/CBOR), compute the manifest, write it and return it.
pub fn commit_leaves_file<P: AsRef<Path>, Q: AsRef<Path>>(
    kind: CombinerKind,
    leaves_path: P,
    capacity: usize,
    out_manifest_path: Q,
) -> Result<RootManifest> {
    let leaves = core_io::read_leaves_auto(&leaves_path)
        .with_context(|| format!("read leaves {}", leaves_path.as_ref().display()))?;
    let man = commit_leaves(kind, &leaves, capacity)?;
    write_manifest_auto(&out_manifest_path, &man)?;
    Ok(man)
}

/// Verify that a leaves file matches a manifest file (by recomputing the root).
pub fn verify_leaves_file_against_manifest<P: AsRef<Path>, Q: AsRef<Path>>(
    leaves_path: P,
    manifest_path: Q,
) -> Result<()> {
    let man = read_manifest_auto(&manifest_path)?;
    let leaves = core_io::read_leaves_auto(&leaves_path)
        .with_context(|| format!("read leaves {}", leaves_path.as_ref().display()))?;
    validate_leaves_against_manifest(&leaves, &man)
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_manifest_auto<P: AsRef<Path>>(path: P) -> Result<RootManifest> {
    core_io::read_auto(path, "manifest")
}

/// Auto-detect write (defaults to JSON if unknown).
pub fn write_manifest_auto<P: AsRef<Path>>(path: P, v: &RootManifest) -> Result<()> {
    core_io::write_auto(path, v, "manifest")
}
