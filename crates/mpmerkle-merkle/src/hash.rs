//! BLAKE3 digest combiner and leaf hashing.
//!
//! - Leaf digest: BLAKE3 over a domain tag and the leaf value (LE).
//! - Parent digest: BLAKE3 over `left || right`.

use blake3::Hasher;
use mpmerkle_core::Combiner;

/// 32-byte BLAKE3 digest.
pub type Digest = [u8; 32];

const LEAF_DOMAIN: &[u8] = b"mpmerkle.leaf.v1";

/// Hash a `u64` leaf value into a digest.
#[inline]
#[must_use]
pub fn leaf_digest(value: u64) -> Digest {
    let mut h = Hasher::new();
    h.update(LEAF_DOMAIN);
    h.update(&value.to_le_bytes());
    *h.finalize().as_bytes()
}

#[inline]
fn merkle_parent(a: &Digest, b: &Digest) -> Digest {
    let mut h = Hasher::new();
    h.update(a);
    h.update(b);
    *h.finalize().as_bytes()
}

/// Combiner producing BLAKE3 Merkle parents.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Combiner;

impl Combiner for Blake3Combiner {
    type Value = Digest;

    #[inline]
    fn combine(&self, left: &Digest, right: &Digest) -> Digest {
        merkle_parent(left, right)
    }
}
