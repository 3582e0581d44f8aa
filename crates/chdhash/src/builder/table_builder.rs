//! Table construction: the displacement search
//!
//! Coordinates the build pipeline:
//! 1. Populate the membership oracle from the key list
//! 2. Size the level arrays for the current load factor
//! 3. Partition keys into level-0 buckets, largest first
//! 4. Displace each bucket into level-1 by seed search
//! 5. On seed exhaustion, decay the load factor and start over
//!
//! Construction is single-threaded and owns all of its scratch state (the
//! occupancy bitmap and the per-trial slot log); nothing of it survives
//! into the finished [`Table`].

use crate::builder::buckets::{partition_into_buckets, BucketStatistics};
use crate::builder::config::{BuildConfiguration, MembershipKind};
use crate::constants::LEVEL0_RATIO;
use crate::hasher::placement_hash;
use crate::membership::MembershipOracle;
use crate::table::Table;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error type for table construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Every load factor down to the configured floor ran some bucket out
    /// of its seed budget.
    #[error("seed space exhausted: no collision-free placement found down to load factor {min_load_factor}")]
    SeedSpaceExhausted {
        /// The floor at which construction gave up
        min_load_factor: f64,
    },
    /// The configuration failed validation.
    #[error("invalid build configuration: {0}")]
    InvalidConfiguration(String),
}

/// Builds immutable lookup tables from static key sets.
pub struct TableBuilder {
    config: BuildConfiguration,
}

impl TableBuilder {
    /// Create a builder with the given configuration
    pub fn new(config: BuildConfiguration) -> Result<Self, BuildError> {
        config.validate().map_err(BuildError::InvalidConfiguration)?;
        Ok(Self { config })
    }

    /// Build a table from a slice of keys.
    ///
    /// Keys must be distinct; the caller asserts uniqueness. Duplicates are
    /// not detected up front — no seed can ever separate two equal keys, so
    /// they burn the seed budget and surface as
    /// [`BuildError::SeedSpaceExhausted`].
    ///
    /// An empty slice yields the empty table.
    pub fn build<K: AsRef<[u8]>>(&self, keys: &[K]) -> Result<Table, BuildError> {
        self.config.print();

        // The oracle depends on the key set alone, not on the placement, so
        // one instance serves every retry.
        let membership = match self.config.membership {
            MembershipKind::Fingerprints => MembershipOracle::fingerprints_from_keys(keys),
            MembershipKind::Bloom { fp_rate } => MembershipOracle::bloom_from_keys(keys, fp_rate),
        };

        if keys.is_empty() {
            info!("empty key set; returning empty table");
            return Ok(Table::empty(membership));
        }

        let mut load_factor = self.config.normalized_load_factor();
        loop {
            if let Some((level0, level1)) = self.try_place(keys, load_factor) {
                info!(
                    "placed {} keys at load factor {:.3} ({} level-0 / {} level-1 slots)",
                    keys.len(),
                    load_factor,
                    level0.len(),
                    level1.len()
                );
                return Ok(Table::new(level0, level1, membership));
            }

            load_factor *= self.config.load_factor_decay;
            if load_factor < self.config.min_load_factor {
                return Err(BuildError::SeedSpaceExhausted {
                    min_load_factor: self.config.min_load_factor,
                });
            }
            warn!("placement failed; retrying at load factor {:.3}", load_factor);
        }
    }

    /// One full placement attempt at a fixed load factor.
    ///
    /// Returns the filled level arrays, or `None` when some bucket exhausts
    /// the seed budget.
    fn try_place<K: AsRef<[u8]>>(&self, keys: &[K], load_factor: f64) -> Option<(Vec<u32>, Vec<u32>)> {
        let num_keys = keys.len();
        // Float floor can undershoot N for load factors near 1; level-1
        // must hold every key. Level-0 needs at least one slot.
        let level1_len = ((num_keys as f64 / load_factor) as usize).max(num_keys);
        let level0_len = (level1_len / LEVEL0_RATIO).max(1);
        debug!(
            "sizing: {} keys, {} level-0 slots, {} level-1 slots",
            num_keys, level0_len, level1_len
        );

        let buckets = partition_into_buckets(keys, level0_len);
        BucketStatistics::from_buckets(&buckets).print_summary();

        let mut level0 = vec![0u32; level0_len];
        let mut level1 = vec![0u32; level1_len];
        let mut occupied = vec![false; level1_len];
        // Slots tentatively claimed by the trial in flight, so a collision
        // can release exactly those and nothing else.
        let mut trial_slots: Vec<usize> = Vec::new();

        for bucket in &buckets {
            let mut seed: u32 = 1;
            'seed: loop {
                trial_slots.clear();
                for &i in &bucket.entries {
                    let slot = placement_hash(seed, keys[i as usize].as_ref()) as usize % level1_len;
                    if occupied[slot] {
                        for &claimed in &trial_slots {
                            occupied[claimed] = false;
                        }
                        if seed >= self.config.max_seed_attempts {
                            debug!(
                                "bucket {} (size {}) exhausted its seed budget",
                                bucket.slot,
                                bucket.entries.len()
                            );
                            return None;
                        }
                        seed += 1;
                        continue 'seed;
                    }
                    occupied[slot] = true;
                    trial_slots.push(slot);
                    level1[slot] = i;
                }
                level0[bucket.slot as usize] = seed;
                break;
            }
        }

        Some((level0, level1))
    }
}
