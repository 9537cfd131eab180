//! Location hashing: coordinate scaling and Z-order (Morton) bit interleaving.
//!
//! Coordinates are first scaled from signed two's complement into unsigned
//! magnitude order with [`scale_unsigned`], then interleaved with [`hash`]:
//!
//! ```text
//! round 0:  x[msb]   y[msb]   z[msb]
//! round 1:  x[msb-1] y[msb-1] z[msb-1]
//! ...
//! ```
//!
//! Every coordinate contributes one bit per round, in input order, before the
//! next round starts. This layout is part of the stored-key format and must not
//! change: keys written by one build have to sort identically in another.
//!
//! ```rust
//! use pointstore::compute::hash::{hash, scale_unsigned};
//!
//! let coords = [scale_unsigned(-3), scale_unsigned(7)];
//! let key = hash(0, 32, &coords)?;
//! assert!(key > 0);
//! # Ok::<(), pointstore::PointStoreError>(())
//! ```

use crate::error::{Result, PointStoreError};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Width of the hash register in bits.
pub const HASH_BITS: u32 = 64;

/// Width of the signed coordinates accepted by [`scale_unsigned`].
pub const COORDINATE_BITS: u32 = 32;

const COORDINATE_BIAS: i64 = i32::MIN as i64;

/// Maps a signed coordinate to its unsigned magnitude-ordered counterpart.
///
/// Strictly monotonic: `a < b` implies `scale_unsigned(a) < scale_unsigned(b)`.
/// The result always lies in `0..2^32`.
#[inline]
pub fn scale_unsigned(value: i32) -> u64 {
    (value as i64 - COORDINATE_BIAS) as u64
}

/// Inverse of [`scale_unsigned`].
///
/// Values outside `0..2^32` wrap modulo the coordinate width.
#[inline]
pub fn scale_signed(value: u64) -> i32 {
    (value as i64).wrapping_add(COORDINATE_BIAS) as i32
}

/// Interleaves the bits of `coordinates` into a single Z-order key.
///
/// For each coordinate the `shift` least significant bits are discarded and the
/// next `precision` bits are interleaved, most significant first. A precision of
/// zero always yields `0`; a single coordinate yields its own (shifted) bits.
///
/// The key holds `coordinates.len() * precision` significant bits; bits beyond
/// 64 are shifted out of the top of the register.
///
/// # Errors
///
/// Returns [`PointStoreError::HashWidth`] if `precision + shift > 64`.
pub fn hash(shift: u32, precision: u32, coordinates: &[u64]) -> Result<u64> {
    if precision.saturating_add(shift) > HASH_BITS {
        return Err(PointStoreError::HashWidth { precision, shift });
    }
    Ok(hash_unchecked(shift, precision, coordinates))
}

/// [`hash`] without the width check.
///
/// Callers must guarantee `precision + shift <= 64`; [`crate::point::Resolution`]
/// does so at construction time. Violating it panics in debug builds.
pub fn hash_unchecked(shift: u32, precision: u32, coordinates: &[u64]) -> u64 {
    debug_assert!(precision + shift <= HASH_BITS);
    if precision == 0 {
        return 0;
    }

    // Align so the selected `precision` bits occupy the top of the register.
    let align = HASH_BITS - (precision + shift);
    let mut working: SmallVec<[u64; 4]> = coordinates.iter().map(|c| c << align).collect();

    let mut out = 0u64;
    for _ in 0..precision {
        for coordinate in working.iter_mut() {
            out = (out << 1) | (*coordinate >> (HASH_BITS - 1));
            *coordinate <<= 1;
        }
    }
    out
}

/// Scales and hashes signed coordinates in one step.
pub fn hash_signed(shift: u32, precision: u32, coordinates: &[i32]) -> Result<u64> {
    let scaled: SmallVec<[u64; 4]> = coordinates.iter().map(|&c| scale_unsigned(c)).collect();
    hash(shift, precision, &scaled)
}

/// Orders two coordinate tuples by their complete interleaved code.
///
/// Gives the same answer as comparing `hash(shift, precision, ..)` of both
/// tuples, but never builds the code, so it also works when
/// `len * precision` exceeds the hash register.
pub fn compare_interleaved(shift: u32, precision: u32, a: &[u64], b: &[u64]) -> Ordering {
    let mask = match precision {
        0 => return Ordering::Equal,
        p if p >= HASH_BITS => u64::MAX,
        p => (1u64 << p) - 1,
    };
    let window = |c: u64| c.checked_shr(shift).unwrap_or(0) & mask;

    // The axis holding the highest differing bit decides. On equal bit
    // positions the earlier axis wins, since it comes first in its round.
    let mut deciding = None;
    let mut widest = 0u64;
    for (axis, (&x, &y)) in a.iter().zip(b).enumerate() {
        let diff = window(x) ^ window(y);
        if widest < diff && widest < (widest ^ diff) {
            widest = diff;
            deciding = Some(axis);
        }
    }

    match deciding {
        Some(axis) => window(a[axis]).cmp(&window(b[axis])),
        None => Ordering::Equal,
    }
}
