//! Membership oracles: the structures answering "was this key an input?".
//!
//! The two-level displacement structure maps *any* query to some index in
//! [0, N); the oracle is what separates real members from impostors. Two
//! backends are supported: a per-key 64-bit fingerprint array (exact up to
//! fingerprint collisions, ~2^-64) and a Bloom filter with a configurable
//! false-positive rate.

use crate::bloom::BloomFilter;
use crate::constants::FINGERPRINT_BYTES;
use crate::hasher::fingerprint;

/// The membership oracle attached to a table.
#[derive(Clone, Debug, PartialEq)]
pub enum MembershipOracle {
    /// One FNV-1a fingerprint per input key, indexed by key position.
    Fingerprints(Vec<u64>),
    /// Bloom filter populated with every input key.
    Bloom(BloomFilter),
}

impl MembershipOracle {
    /// Fingerprint every key, in input order.
    pub fn fingerprints_from_keys<K: AsRef<[u8]>>(keys: &[K]) -> Self {
        Self::Fingerprints(keys.iter().map(|k| fingerprint(k.as_ref())).collect())
    }

    /// Populate a Bloom filter sized for the key count at `fp_rate`.
    pub fn bloom_from_keys<K: AsRef<[u8]>>(keys: &[K], fp_rate: f64) -> Self {
        let mut filter = BloomFilter::with_rate(keys.len(), fp_rate);
        for key in keys {
            filter.insert(key.as_ref());
        }
        Self::Bloom(filter)
    }

    /// Whether `key` plausibly sits at position `candidate` in the original
    /// input.
    ///
    /// The fingerprint variant compares against the candidate's stored
    /// fingerprint; the Bloom variant ignores the candidate and answers set
    /// membership. An out-of-range candidate (possible when a non-member
    /// query reads an unoccupied level-1 slot) verifies as false.
    #[inline]
    pub fn verify(&self, candidate: u32, key: &[u8]) -> bool {
        match self {
            Self::Fingerprints(fps) => fps
                .get(candidate as usize)
                .map_or(false, |&fp| fp == fingerprint(key)),
            Self::Bloom(filter) => filter.contains(key),
        }
    }

    /// Number of bytes the oracle contributes to a serialized table.
    pub fn payload_len(&self) -> usize {
        match self {
            Self::Fingerprints(fps) => fps.len() * FINGERPRINT_BYTES,
            Self::Bloom(filter) => filter.payload_len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprints_verify_by_position() {
        let keys = ["alpha", "beta", "gamma"];
        let oracle = MembershipOracle::fingerprints_from_keys(&keys);

        assert!(oracle.verify(0, b"alpha"));
        assert!(oracle.verify(1, b"beta"));
        // Right key, wrong position: the fingerprint at 0 is alpha's.
        assert!(!oracle.verify(0, b"beta"));
        assert!(!oracle.verify(2, b"delta"));
    }

    #[test]
    fn test_fingerprints_out_of_range_candidate() {
        let oracle = MembershipOracle::fingerprints_from_keys(&["only"]);
        assert!(!oracle.verify(5, b"only"));
    }

    #[test]
    fn test_bloom_verify_ignores_candidate() {
        let keys = ["alpha", "beta"];
        let oracle = MembershipOracle::bloom_from_keys(&keys, 0.01);

        assert!(oracle.verify(0, b"beta"));
        assert!(oracle.verify(99, b"alpha"));
    }

    #[test]
    fn test_empty_oracles() {
        let none: [&str; 0] = [];
        assert!(!MembershipOracle::fingerprints_from_keys(&none).verify(0, b"x"));
        assert!(!MembershipOracle::bloom_from_keys(&none, 0.01).verify(0, b"x"));
    }

    #[test]
    fn test_payload_len() {
        let oracle = MembershipOracle::fingerprints_from_keys(&["a", "b", "c"]);
        assert_eq!(oracle.payload_len(), 3 * FINGERPRINT_BYTES);
    }
}
