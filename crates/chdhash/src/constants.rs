//! Constants and tunables for table construction and the binary format.
//!
//! This module defines the format version bytes, the serialized field
//! widths, and the default knobs for the displacement search. Everything
//! here is a compile-time constant; there is no runtime state.

/// Binary format version for tables carrying a Bloom filter oracle.
pub const FORMAT_VERSION_BLOOM: u8 = 1;

/// Binary format version for tables carrying a fingerprint array oracle.
pub const FORMAT_VERSION_FINGERPRINTS: u8 = 2;

/// Width in bytes of each u64 header field (oracle length, m0, m1).
pub const HEADER_WORD_BYTES: usize = 8;

/// Total header length: one version byte plus three u64 fields.
pub const HEADER_BYTES: usize = 1 + 3 * HEADER_WORD_BYTES;

/// Width in bytes of one level-array entry.
pub const LEVEL_ENTRY_BYTES: usize = 4;

/// Width in bytes of one serialized membership fingerprint.
pub const FINGERPRINT_BYTES: usize = 8;

/// Ratio between the level-1 and level-0 array lengths: one bucket seed
/// serves four second-level slots.
pub const LEVEL0_RATIO: usize = 4;

/// Default cap on seeds tried for a single bucket before the whole
/// placement attempt is abandoned.
pub const DEFAULT_MAX_SEED_ATTEMPTS: u32 = 100_000_000;

/// Default multiplier applied to the load factor after a failed attempt.
pub const DEFAULT_LOAD_FACTOR_DECAY: f64 = 0.9;

/// Default floor below which the load factor is not decayed any further.
pub const DEFAULT_MIN_LOAD_FACTOR: f64 = 0.1;

/// Crate version
pub const VERSION: (u8, u8, u8) = (0, 1, 0);
