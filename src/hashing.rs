//! Hash combination and deterministic native hashing.

use core::hash::{Hash, Hasher};
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

/// Hash of a null operand.
pub const NULL_HASH: u64 = 0x6e75_6c6c_6e75_6c6c;

/// Hash of a composite value nested at or below the configured hash depth.
pub const CYCLE_HASH: u64 = 0x6379_636c_6563_7963;

const MIX: u64 = 0x517c_c1b7_2722_0a95;

/// Order-sensitive accumulator of sub-hashes.
///
/// `combine(a).combine(b)` and `combine(b).combine(a)` differ for almost all
/// inputs, so permuting the elements of an ordered container changes its
/// hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashCombiner {
    state: u64,
}

impl HashCombiner {
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn combine(self, value: u64) -> Self {
        Self {
            state: (self.state.rotate_left(5) ^ value).wrapping_mul(MIX),
        }
    }

    #[inline]
    pub fn add(&mut self, value: u64) {
        *self = self.combine(value);
    }

    #[inline]
    pub fn finish(&self) -> u64 {
        // Final avalanche so short inputs still spread over all bits.
        let mut h = self.state;
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
        h ^= h >> 33;
        h
    }
}

/// Hashes a value through its `Hash` impl with a fixed-key hasher, so the
/// result is the same in every process.
pub fn hash_native<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = Xxh3::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Seed contributed by a type, derived from its name.
pub fn type_seed(type_name: &str) -> u64 {
    xxh3_64(type_name.as_bytes())
}
