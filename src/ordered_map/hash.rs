//! The table's two-stage string hash. djb2 folds the key's bytes into a
//! 32-bit accumulator, then Knuth's multiplicative method spreads that
//! accumulator over the buckets.
//!
//! Bucket placement depends on both stages bit for bit, including the `f64`
//! arithmetic of the second one.

use std::hash::Hasher;

use super::{HASH_MULTIPLIER, HASH_SEED, KNUTH_CONSTANT};

/// Folds bytes into a wrapping 32-bit djb2 accumulator.
///
/// Feed it raw bytes through [`Hasher::write`]. Going through `str`'s `Hash`
/// impl would also fold in the `0xff` terminator it writes.
#[derive(Clone, Copy, Debug)]
pub struct Djb2Hasher(u32);

impl Default for Djb2Hasher {
    fn default() -> Self {
        Djb2Hasher(HASH_SEED)
    }
}

impl Hasher for Djb2Hasher {
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 = self
                .0
                .wrapping_mul(HASH_MULTIPLIER)
                .wrapping_add(u32::from(*byte));
        }
    }

    fn finish(&self) -> u64 {
        u64::from(self.0)
    }
}

/// The djb2 accumulator for `key`.
pub fn hash_key(key: &str) -> u32 {
    let mut h = Djb2Hasher::default();
    h.write(key.as_bytes());
    h.0
}

/// The bucket `key` belongs in for a table of `size` buckets:
/// `ceil(size * fract(hash * A)) - 1`. A fractional part of exactly zero
/// lands in bucket 0.
pub fn bucket_index(key: &str, size: usize) -> usize {
    debug_assert!(size > 0, "a table always has buckets");

    let frac = (f64::from(hash_key(key)) * KNUTH_CONSTANT).fract();
    ((size as f64 * frac).ceil() as usize).saturating_sub(1)
}
