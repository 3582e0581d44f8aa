//! Deterministic hash primitives shared by construction and lookup.
//!
//! The placement hash is seeded MurmurHash3-32 and the membership
//! fingerprint is 64-bit FNV-1a. Both are pure functions of the key bytes,
//! so a key hashes identically at build time, at query time, and after a
//! serialization round-trip on any platform.

use fnv::FnvHasher;
use std::hash::Hasher;
use std::io::Cursor;

/// Seeded 32-bit placement hash over raw key bytes.
///
/// Seed 0 is the primary hash used for level-0 bucketing; seeds 1, 2, ...
/// are trialled in order during level-1 placement.
#[inline]
pub fn placement_hash(seed: u32, key: &[u8]) -> u32 {
    // Reading from an in-memory cursor cannot fail.
    murmur3::murmur3_32(&mut Cursor::new(key), seed).unwrap_or(0)
}

/// 64-bit FNV-1a fingerprint of a key, stored per input position by the
/// fingerprint membership oracle.
#[inline]
pub fn fingerprint(key: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(key);
    hasher.finish()
}

/// Two independent 64-bit base hashes for Bloom double hashing, taken as
/// the low and high halves of one 128-bit murmur3 evaluation.
#[inline]
pub fn bloom_hash_pair(key: &[u8]) -> (u64, u64) {
    let h = murmur3::murmur3_x64_128(&mut Cursor::new(key), 0).unwrap_or(0);
    (h as u64, (h >> 64) as u64)
}
