//! Build configuration for table construction
//!
//! Parameters for the displacement search: target load factor, membership
//! oracle choice, and the seed-budget / retry tunables.

use crate::constants::{
    DEFAULT_LOAD_FACTOR_DECAY, DEFAULT_MAX_SEED_ATTEMPTS, DEFAULT_MIN_LOAD_FACTOR,
};

/// Which membership oracle the builder attaches to the finished table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MembershipKind {
    /// One 64-bit fingerprint per key; false positives only on fingerprint
    /// collisions (~2^-64).
    Fingerprints,
    /// Bloom filter sized for the given target false-positive rate.
    Bloom {
        /// Target false-positive rate, in (0, 1).
        fp_rate: f64,
    },
}

/// Configuration parameters for building a table
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    /// Target load factor N / m1. Values of exactly 0 or above 1 are
    /// clamped to 1 at build time; negative or non-finite values are
    /// rejected by [`validate`](Self::validate).
    pub load_factor: f64,

    /// Membership oracle attached to the finished table.
    pub membership: MembershipKind,

    /// Seeds tried for a single bucket before the placement attempt at the
    /// current load factor is abandoned.
    pub max_seed_attempts: u32,

    /// Multiplier applied to the load factor after a failed attempt.
    pub load_factor_decay: f64,

    /// Floor below which construction gives up instead of decaying further.
    pub min_load_factor: f64,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            load_factor: 1.0,
            membership: MembershipKind::Fingerprints,
            max_seed_attempts: DEFAULT_MAX_SEED_ATTEMPTS,
            load_factor_decay: DEFAULT_LOAD_FACTOR_DECAY,
            min_load_factor: DEFAULT_MIN_LOAD_FACTOR,
        }
    }
}

impl BuildConfiguration {
    /// Configuration with the fingerprint oracle at the given load factor.
    pub fn new(load_factor: f64) -> Self {
        Self {
            load_factor,
            ..Self::default()
        }
    }

    /// Configuration with a Bloom filter oracle at the given load factor
    /// and target false-positive rate.
    pub fn with_bloom(load_factor: f64, fp_rate: f64) -> Self {
        Self {
            load_factor,
            membership: MembershipKind::Bloom { fp_rate },
            ..Self::default()
        }
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if !self.load_factor.is_finite() || self.load_factor < 0.0 {
            return Err(format!("load_factor must be a non-negative finite number, got {}", self.load_factor));
        }
        if self.max_seed_attempts == 0 {
            return Err("max_seed_attempts must be at least 1".to_string());
        }
        if !(self.load_factor_decay > 0.0 && self.load_factor_decay < 1.0) {
            return Err(format!("load_factor_decay must lie in (0, 1), got {}", self.load_factor_decay));
        }
        if !(self.min_load_factor > 0.0 && self.min_load_factor <= 1.0) {
            return Err(format!("min_load_factor must lie in (0, 1], got {}", self.min_load_factor));
        }
        if let MembershipKind::Bloom { fp_rate } = self.membership {
            if !(fp_rate > 0.0 && fp_rate < 1.0) {
                return Err(format!("bloom fp_rate must lie in (0, 1), got {fp_rate}"));
            }
        }
        Ok(())
    }

    /// Load factor with the documented clamping applied: 0 and anything
    /// above 1 both mean "fully loaded".
    pub(crate) fn normalized_load_factor(&self) -> f64 {
        if self.load_factor == 0.0 || self.load_factor > 1.0 {
            1.0
        } else {
            self.load_factor
        }
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Build Configuration:");
        tracing::info!("  load_factor = {}", self.load_factor);
        tracing::info!("  membership = {:?}", self.membership);
        tracing::debug!("  max_seed_attempts = {}", self.max_seed_attempts);
        tracing::debug!("  load_factor_decay = {}", self.load_factor_decay);
        tracing::debug!("  min_load_factor = {}", self.min_load_factor);
    }
}
