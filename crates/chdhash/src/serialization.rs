//! Binary codec for [`Table`]
//!
//! A table serializes to one contiguous little-endian buffer:
//!
//! ```text
//! offset 0   version: u8      1 = Bloom oracle, 2 = fingerprint oracle
//! offset 1   K: u64           oracle payload bytes (Bloom) or
//!                             fingerprint count (fingerprints)
//! offset 9   m0: u64          level-0 length
//! offset 17  m1: u64          level-1 length
//! offset 25  oracle payload   K bytes, or K * 8 fingerprint bytes
//! ...        level0           m0 * 4 bytes
//! ...        level1           m1 * 4 bytes
//! ```
//!
//! The version byte doubles as the oracle discriminant. Encoding is
//! infallible and deterministic; decoding validates the version and the
//! exact total length before touching any payload, and a decoded table
//! answers every query exactly as the original did.

use crate::bloom::{BloomFilter, OracleError};
use crate::constants::{
    FINGERPRINT_BYTES, FORMAT_VERSION_BLOOM, FORMAT_VERSION_FINGERPRINTS, HEADER_BYTES,
    HEADER_WORD_BYTES, LEVEL_ENTRY_BYTES,
};
use crate::membership::MembershipOracle;
use crate::table::Table;
use thiserror::Error;

/// Error type for table decoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ends before the header does.
    #[error("buffer too short: {got} bytes, header alone needs {need}")]
    BufferTooShort {
        /// Bytes present in the buffer
        got: usize,
        /// Bytes the header requires
        need: usize,
    },
    /// The version byte names no known format.
    #[error("unknown format version {0}")]
    UnknownVersion(u8),
    /// The buffer length disagrees with the lengths the header declares.
    #[error("length mismatch: buffer holds {actual} bytes, header implies {expected}")]
    LengthMismatch {
        /// Total length implied by the header fields
        expected: u64,
        /// Bytes actually present
        actual: u64,
    },
    /// The membership oracle payload failed to decode.
    #[error("membership oracle payload: {0}")]
    Oracle(#[from] OracleError),
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(word)
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(word)
}

impl Table {
    /// Serialize the table to its binary format.
    ///
    /// Deterministic: the same table always produces the same bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (version, oracle_len, payload) = match self.membership() {
            MembershipOracle::Fingerprints(fps) => {
                let mut payload = Vec::with_capacity(fps.len() * FINGERPRINT_BYTES);
                for fp in fps {
                    payload.extend_from_slice(&fp.to_le_bytes());
                }
                (FORMAT_VERSION_FINGERPRINTS, fps.len() as u64, payload)
            }
            MembershipOracle::Bloom(filter) => {
                let payload = filter.to_bytes();
                (FORMAT_VERSION_BLOOM, payload.len() as u64, payload)
            }
        };

        let level_bytes = (self.level0().len() + self.level1().len()) * LEVEL_ENTRY_BYTES;
        let mut data = Vec::with_capacity(HEADER_BYTES + payload.len() + level_bytes);
        data.push(version);
        data.extend_from_slice(&oracle_len.to_le_bytes());
        data.extend_from_slice(&(self.level0().len() as u64).to_le_bytes());
        data.extend_from_slice(&(self.level1().len() as u64).to_le_bytes());
        data.extend_from_slice(&payload);
        for entry in self.level0() {
            data.extend_from_slice(&entry.to_le_bytes());
        }
        for entry in self.level1() {
            data.extend_from_slice(&entry.to_le_bytes());
        }
        data
    }

    /// Decode a table from its binary format.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < HEADER_BYTES {
            return Err(DecodeError::BufferTooShort {
                got: data.len(),
                need: HEADER_BYTES,
            });
        }
        let version = data[0];
        let oracle_len = read_u64(data, 1);
        let m0 = read_u64(data, 1 + HEADER_WORD_BYTES);
        let m1 = read_u64(data, 1 + 2 * HEADER_WORD_BYTES);

        // Widened arithmetic: header fields are attacker-controlled and the
        // total must be compared, not trusted.
        let payload_len: u128 = match version {
            FORMAT_VERSION_BLOOM => u128::from(oracle_len),
            FORMAT_VERSION_FINGERPRINTS => u128::from(oracle_len) * FINGERPRINT_BYTES as u128,
            other => return Err(DecodeError::UnknownVersion(other)),
        };
        let expected = HEADER_BYTES as u128
            + payload_len
            + (u128::from(m0) + u128::from(m1)) * LEVEL_ENTRY_BYTES as u128;
        if data.len() as u128 != expected {
            return Err(DecodeError::LengthMismatch {
                expected: expected.min(u128::from(u64::MAX)) as u64,
                actual: data.len() as u64,
            });
        }

        // The sections are now known to tile the buffer exactly.
        let payload_len = payload_len as usize;
        let m0 = m0 as usize;
        let m1 = m1 as usize;
        let payload = &data[HEADER_BYTES..HEADER_BYTES + payload_len];

        let membership = match version {
            FORMAT_VERSION_BLOOM => MembershipOracle::Bloom(BloomFilter::from_bytes(payload)?),
            _ => MembershipOracle::Fingerprints(
                (0..oracle_len as usize)
                    .map(|i| read_u64(payload, i * FINGERPRINT_BYTES))
                    .collect(),
            ),
        };

        let mut offset = HEADER_BYTES + payload_len;
        let level0 = (0..m0)
            .map(|i| read_u32(data, offset + i * LEVEL_ENTRY_BYTES))
            .collect();
        offset += m0 * LEVEL_ENTRY_BYTES;
        let level1 = (0..m1)
            .map(|i| read_u32(data, offset + i * LEVEL_ENTRY_BYTES))
            .collect();

        Ok(Table::new(level0, level1, membership))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build, build_with_bloom};

    #[test]
    fn test_roundtrip_fingerprint_table() {
        let keys = ["alpha", "beta", "gamma", "delta"];
        let table = build(&keys, 1.0).unwrap();
        let decoded = Table::from_bytes(&table.to_bytes()).unwrap();

        assert_eq!(decoded, table);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(decoded.lookup(key), Some(i as u32));
        }
        assert_eq!(decoded.lookup("epsilon"), None);
    }

    #[test]
    fn test_roundtrip_bloom_table() {
        let keys = ["alpha", "beta", "gamma", "delta"];
        let table = build_with_bloom(&keys, 1.0, 0.01).unwrap();
        let decoded = Table::from_bytes(&table.to_bytes()).unwrap();

        assert_eq!(decoded, table);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(decoded.lookup(key), Some(i as u32));
        }
    }

    #[test]
    fn test_roundtrip_empty_table() {
        let keys: [&str; 0] = [];
        let table = build(&keys, 1.0).unwrap();
        let bytes = table.to_bytes();
        assert_eq!(bytes.len(), HEADER_BYTES);

        let decoded = Table::from_bytes(&bytes).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.lookup("anything"), None);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let keys = ["alpha", "beta", "gamma"];
        let table = build(&keys, 1.0).unwrap();
        assert_eq!(table.to_bytes(), table.to_bytes());
    }

    #[test]
    fn test_version_byte_selects_oracle() {
        let keys = ["alpha", "beta"];
        assert_eq!(build(&keys, 1.0).unwrap().to_bytes()[0], FORMAT_VERSION_FINGERPRINTS);
        assert_eq!(
            build_with_bloom(&keys, 1.0, 0.01).unwrap().to_bytes()[0],
            FORMAT_VERSION_BLOOM
        );
    }

    #[test]
    fn test_decode_buffer_too_short() {
        let err = Table::from_bytes(&[FORMAT_VERSION_FINGERPRINTS; 10]).unwrap_err();
        assert_eq!(err, DecodeError::BufferTooShort { got: 10, need: HEADER_BYTES });
    }

    #[test]
    fn test_decode_unknown_version() {
        let mut bytes = build(&["a"], 1.0).unwrap().to_bytes();
        bytes[0] = 0xEE;
        assert_eq!(Table::from_bytes(&bytes).unwrap_err(), DecodeError::UnknownVersion(0xEE));
    }

    #[test]
    fn test_decode_truncated_body() {
        let bytes = build(&["a", "b", "c"], 1.0).unwrap().to_bytes();
        let err = Table::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, DecodeError::LengthMismatch { .. }));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = build(&["a", "b", "c"], 1.0).unwrap().to_bytes();
        bytes.push(0);
        assert!(matches!(
            Table::from_bytes(&bytes),
            Err(DecodeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_oversized_header_fields() {
        // Header that declares astronomically long sections must fail the
        // length check, not wrap around.
        let mut bytes = vec![FORMAT_VERSION_FINGERPRINTS];
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            Table::from_bytes(&bytes),
            Err(DecodeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_corrupt_bloom_payload() {
        let keys = ["alpha", "beta"];
        let mut bytes = build_with_bloom(&keys, 1.0, 0.01).unwrap().to_bytes();
        // Declare one more filter bit than the body carries; total length
        // still matches, so only the oracle codec can catch it.
        let declared = read_u64(&bytes, HEADER_BYTES + 1);
        bytes[HEADER_BYTES + 1..HEADER_BYTES + 9].copy_from_slice(&(declared + 9).to_le_bytes());
        assert!(matches!(
            Table::from_bytes(&bytes),
            Err(DecodeError::Oracle(OracleError::PayloadLengthMismatch { .. }))
        ));
    }
}
