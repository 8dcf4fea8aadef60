//! Key hashing and hash slicing for the HAMT.
//!
//! Keys are hashed to 32 bits and the trie consumes the hash 5 bits at a
//! time, lowest bits first. The hasher is chosen at compile time:
//!
//! | Feature   | Hasher                                   |
//! |-----------|------------------------------------------|
//! | (default) | `std::collections::hash_map::DefaultHasher` |
//! | `fxhash`  | `rustc_hash::FxHasher`                   |
//! | `ahash`   | `ahash::AHasher` with fixed seeds        |
//!
//! Every choice is deterministic: the same key hashes the same way in every
//! map and every process, so traversal order is reproducible.

use std::hash::{Hash, Hasher};

/// Width of the hash consumed by the trie.
pub(crate) const HASH_BITS: u32 = 32;

/// Bits consumed per trie level.
pub(crate) const BITS_PER_LEVEL: u32 = 5;

/// Branching factor (2^5 = 32).
pub(crate) const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Bit mask for extracting a slot index from a shifted hash.
const MASK: u32 = (1 << BITS_PER_LEVEL) - 1;

/// Number of branching levels before the hash is exhausted (shifts 0..=30).
pub(crate) const MAX_TRIE_DEPTH: usize = HASH_BITS.div_ceil(BITS_PER_LEVEL) as usize;

#[cfg(feature = "fxhash")]
fn new_hasher() -> impl Hasher {
    rustc_hash::FxHasher::default()
}

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
fn new_hasher() -> impl Hasher {
    use std::hash::BuildHasher;

    ahash::RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    )
    .build_hasher()
}

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
fn new_hasher() -> impl Hasher {
    std::collections::hash_map::DefaultHasher::new()
}

/// Computes the 32-bit trie hash of a key.
///
/// The 64-bit hasher output is folded by xoring its halves so that both
/// halves contribute to every slot index.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn compute_hash<K: Hash + ?Sized>(key: &K) -> u32 {
    let mut hasher = new_hasher();
    key.hash(&mut hasher);
    let wide = hasher.finish();
    (wide ^ (wide >> 32)) as u32
}

/// Extracts the 5-bit slot index for the level at `shift`.
#[inline]
pub(crate) const fn fragment(hash: u32, shift: u32) -> usize {
    ((hash >> shift) & MASK) as usize
}

/// Returns the single-bit bitmap flag for the slot at `shift`.
#[inline]
pub(crate) const fn bit_position(hash: u32, shift: u32) -> u32 {
    1 << fragment(hash, shift)
}

/// Returns the position in a compressed children array of the slot marked by `bit`.
#[inline]
pub(crate) const fn sparse_index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}
