//! Small shape helpers for power-of-two reduction schedules.
//!
//! - `ceil_log2`: tiny ceil-log helper (merge passes per chunk)
//! - `expected_layer_count`: number of layers the planner emits for `(n, c)`
//!
//! The driver reports merge passes per chunk with `ceil_log2`; the planner's
//! tests check layer counts against `expected_layer_count`.

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

/// Compute `ceil(log2(x))` with the convention `ceil_log2(0) = ceil_log2(1) = 0`.
///
/// For a power-of-two chunk this is the exact number of merge passes.
#[inline]
#[must_use]
pub const fn ceil_log2(x: usize) -> u32 {
    if x <= 1 {
        0
    } else {
        usize::BITS - (x - 1).leading_zeros()
    }
}

/// Layers (including the terminal one) needed to bring `n` values down to
/// one unit of capacity `c`, by repeated `ceil(size / c)` while `size > c`.
///
/// Returns `None` when `c < 2` and `n > 1` (no progress is possible) or when
/// `n == 0`.
#[must_use]
pub const fn expected_layer_count(n: usize, c: usize) -> Option<usize> {
    if n == 0 || c == 0 || (c == 1 && n > 1) {
        return None;
    }
    let mut size = n;
    let mut layers = 1;
    while size > c {
        size = size.div_ceil(c);
        layers += 1;
    }
    Some(layers)
}
