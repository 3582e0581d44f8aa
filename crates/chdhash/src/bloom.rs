//! Bloom filter membership oracle.
//!
//! Sized from the key count and a target false-positive rate with the
//! standard formulas, with bit indices derived by Kirsch-Mitzenmacher
//! double hashing over one 128-bit base hash:
//! `index_i = (h1 + i * h2) mod num_bits`.

use crate::hasher::bloom_hash_pair;
use thiserror::Error;

/// Serialized prefix of a filter: hash-count byte plus bit-length word.
const PAYLOAD_HEADER_BYTES: usize = 1 + 8;

/// Upper bound on the number of hash functions; the sizing formula stays
/// well below this for any false-positive rate worth configuring.
const MAX_NUM_HASHES: u64 = 30;

/// Error type for membership oracle payload decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The payload ends before the filter header does.
    #[error("bloom payload too short: got {got} bytes, need at least {need}")]
    PayloadTooShort {
        /// Bytes present in the payload
        got: usize,
        /// Bytes the filter header requires
        need: usize,
    },
    /// The payload body disagrees with the declared bit length.
    #[error("bloom payload length mismatch: {declared} bits declared, {actual} body bytes")]
    PayloadLengthMismatch {
        /// Bit length declared by the filter header
        declared: u64,
        /// Bytes actually present after the header
        actual: usize,
    },
}

/// A Bloom filter over the input key set.
///
/// A `false` answer is definitive; a `true` answer may be a false positive
/// at the rate the filter was sized for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    num_hashes: u8,
    num_bits: u64,
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Create an empty filter sized for `num_keys` insertions at the target
    /// false-positive rate.
    ///
    /// Uses `m = ceil(-n ln p / (ln 2)^2)` bits and `k = round((m/n) ln 2)`
    /// hash functions. `fp_rate` must lie in (0, 1); the builder validates
    /// this before constructing a filter. `num_keys == 0` yields a zero-bit
    /// filter that answers `false` for everything.
    pub fn with_rate(num_keys: usize, fp_rate: f64) -> Self {
        if num_keys == 0 {
            return Self {
                num_hashes: 0,
                num_bits: 0,
                bits: Vec::new(),
            };
        }
        let n = num_keys as f64;
        let ln2 = std::f64::consts::LN_2;
        let num_bits = ((-(n * fp_rate.ln())) / (ln2 * ln2)).ceil().max(1.0) as u64;
        let num_hashes = (((num_bits as f64 / n) * ln2).round() as u64).clamp(1, MAX_NUM_HASHES) as u8;
        Self {
            num_hashes,
            num_bits,
            bits: vec![0u8; num_bits.div_ceil(8) as usize],
        }
    }

    /// Insert a key into the filter.
    pub fn insert(&mut self, key: &[u8]) {
        if self.num_bits == 0 {
            return;
        }
        let (h1, h2) = bloom_hash_pair(key);
        for i in 0..self.num_hashes {
            let bit = self.bit_index(h1, h2, i);
            self.bits[bit / 8] |= 1 << (bit % 8);
        }
    }

    /// Whether the key might have been inserted.
    pub fn contains(&self, key: &[u8]) -> bool {
        if self.num_bits == 0 {
            return false;
        }
        let (h1, h2) = bloom_hash_pair(key);
        for i in 0..self.num_hashes {
            let bit = self.bit_index(h1, h2, i);
            if self.bits[bit / 8] & (1 << (bit % 8)) == 0 {
                return false;
            }
        }
        true
    }

    /// Number of bytes [`to_bytes`](Self::to_bytes) produces.
    pub fn payload_len(&self) -> usize {
        PAYLOAD_HEADER_BYTES + self.bits.len()
    }

    /// Serialize the filter: hash count, bit length, then the bit array.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.payload_len());
        data.push(self.num_hashes);
        data.extend_from_slice(&self.num_bits.to_le_bytes());
        data.extend_from_slice(&self.bits);
        data
    }

    /// Decode a filter from the [`to_bytes`](Self::to_bytes) form.
    pub fn from_bytes(data: &[u8]) -> Result<Self, OracleError> {
        if data.len() < PAYLOAD_HEADER_BYTES {
            return Err(OracleError::PayloadTooShort {
                got: data.len(),
                need: PAYLOAD_HEADER_BYTES,
            });
        }
        let num_hashes = data[0];
        let mut word = [0u8; 8];
        word.copy_from_slice(&data[1..PAYLOAD_HEADER_BYTES]);
        let num_bits = u64::from_le_bytes(word);

        let body = &data[PAYLOAD_HEADER_BYTES..];
        if body.len() as u64 != num_bits.div_ceil(8) {
            return Err(OracleError::PayloadLengthMismatch {
                declared: num_bits,
                actual: body.len(),
            });
        }
        Ok(Self {
            num_hashes,
            num_bits,
            bits: body.to_vec(),
        })
    }

    fn bit_index(&self, h1: u64, h2: u64, i: u8) -> usize {
        (h1.wrapping_add(u64::from(i).wrapping_mul(h2)) % self.num_bits) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_false_negatives() {
        let keys: Vec<String> = (0..200).map(|i| format!("key-{i}")).collect();
        let mut filter = BloomFilter::with_rate(keys.len(), 0.01);
        for key in &keys {
            filter.insert(key.as_bytes());
        }
        for key in &keys {
            assert!(filter.contains(key.as_bytes()), "lost key {key}");
        }
    }

    #[test]
    fn test_misses_most_non_members() {
        let mut filter = BloomFilter::with_rate(100, 0.01);
        for i in 0..100 {
            filter.insert(format!("member-{i}").as_bytes());
        }
        let hits = (0..1000)
            .filter(|i| filter.contains(format!("outsider-{i}").as_bytes()))
            .count();
        // Expected ~10 false positives at 1%; 50 leaves generous slack.
        assert!(hits < 50, "{hits} false positives out of 1000");
    }

    #[test]
    fn test_empty_filter_contains_nothing() {
        let filter = BloomFilter::with_rate(0, 0.01);
        assert!(!filter.contains(b"anything"));
        assert!(!filter.contains(b""));
    }

    #[test]
    fn test_roundtrip() {
        let mut filter = BloomFilter::with_rate(50, 0.05);
        for i in 0..50 {
            filter.insert(format!("k{i}").as_bytes());
        }
        let decoded = BloomFilter::from_bytes(&filter.to_bytes()).unwrap();
        assert_eq!(decoded, filter);
    }

    #[test]
    fn test_from_bytes_too_short() {
        let err = BloomFilter::from_bytes(&[1, 2, 3]).unwrap_err();
        assert_eq!(err, OracleError::PayloadTooShort { got: 3, need: PAYLOAD_HEADER_BYTES });
    }

    #[test]
    fn test_from_bytes_length_mismatch() {
        let mut data = BloomFilter::with_rate(10, 0.01).to_bytes();
        data.push(0);
        assert!(matches!(
            BloomFilter::from_bytes(&data),
            Err(OracleError::PayloadLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_sizing_grows_with_stricter_rate() {
        let loose = BloomFilter::with_rate(1000, 0.1);
        let strict = BloomFilter::with_rate(1000, 0.001);
        assert!(strict.num_bits > loose.num_bits);
        assert!(strict.num_hashes >= loose.num_hashes);
    }
}
