// chdhash: minimal perfect hash tables over static string keys
//
// Implements the "hash, displace, and compress" construction
// (Belazzougui, Botelho, Dietzfelbinger, ESA 2009) with O(1) lookups
// and a compact single-buffer serialized form.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bloom;
pub mod builder;
pub mod constants;
pub mod hasher;
pub mod membership;
pub mod serialization;
pub mod table;

// Re-export common types at crate root
pub use bloom::{BloomFilter, OracleError};
pub use builder::{BuildConfiguration, BuildError, MembershipKind, TableBuilder};
pub use membership::MembershipOracle;
pub use serialization::DecodeError;
pub use table::Table;

/// Build a table over `keys` with the fingerprint-array membership oracle.
///
/// `load_factor` is the target density of the second-level array; 0 and
/// values above 1 are clamped to 1. Each key's index in `keys` is the index
/// [`Table::lookup`] returns for it.
pub fn build<K: AsRef<[u8]>>(keys: &[K], load_factor: f64) -> Result<Table, BuildError> {
    TableBuilder::new(BuildConfiguration::new(load_factor))?.build(keys)
}

/// Build a table over `keys` with a Bloom filter membership oracle at the
/// given target false-positive rate.
///
/// Non-member lookups may return `Some` at roughly `fp_rate`; the returned
/// index is meaningless for such queries.
pub fn build_with_bloom<K: AsRef<[u8]>>(
    keys: &[K],
    load_factor: f64,
    fp_rate: f64,
) -> Result<Table, BuildError> {
    TableBuilder::new(BuildConfiguration::with_bloom(load_factor, fp_rate))?.build(keys)
}

/// Version information
pub fn version() -> (u8, u8, u8) {
    constants::VERSION
}
