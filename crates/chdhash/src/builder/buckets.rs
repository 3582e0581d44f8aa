//! Primary bucketing and bucket ordering
//!
//! The primary hash (seed 0) partitions keys into level-0 buckets. Buckets
//! are then placed largest-first: big buckets need many free slots and get
//! them while level-1 is still sparse, while singletons placed last fit
//! almost anywhere.

use crate::hasher::placement_hash;
use tracing::info;

/// A level-0 bucket: the slot it hashes to and the keys it holds.
#[derive(Debug, Clone)]
pub struct Bucket {
    /// Index into the level-0 seed array.
    pub slot: u32,
    /// Positions in the original key slice, in input order.
    pub entries: Vec<u32>,
}

/// Assign every key to its level-0 bucket and return the non-empty buckets
/// in placement order: size descending, ties by slot ascending.
///
/// The tie-break is fixed so that identical inputs always place identically
/// and therefore serialize to identical bytes. `num_buckets` must be at
/// least 1.
pub fn partition_into_buckets<K: AsRef<[u8]>>(keys: &[K], num_buckets: usize) -> Vec<Bucket> {
    let mut sparse: Vec<Vec<u32>> = vec![Vec::new(); num_buckets];
    for (i, key) in keys.iter().enumerate() {
        let slot = placement_hash(0, key.as_ref()) as usize % num_buckets;
        sparse[slot].push(i as u32);
    }

    let mut buckets: Vec<Bucket> = sparse
        .into_iter()
        .enumerate()
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(slot, entries)| Bucket {
            slot: slot as u32,
            entries,
        })
        .collect();

    buckets.sort_by(|a, b| {
        b.entries
            .len()
            .cmp(&a.entries.len())
            .then(a.slot.cmp(&b.slot))
    });
    buckets
}

/// Statistics about the level-0 bucket distribution
#[derive(Debug, Clone, Default)]
pub struct BucketStatistics {
    /// Number of non-empty buckets
    pub num_buckets: usize,

    /// Total number of keys across all buckets
    pub num_keys: usize,

    /// Number of buckets holding a single key
    pub num_singletons: usize,

    /// Maximum observed bucket size
    pub max_bucket_size: usize,
}

impl BucketStatistics {
    /// Gather statistics over a partitioned key set
    pub fn from_buckets(buckets: &[Bucket]) -> Self {
        let mut stats = Self::default();
        for bucket in buckets {
            stats.num_buckets += 1;
            stats.num_keys += bucket.entries.len();
            if bucket.entries.len() == 1 {
                stats.num_singletons += 1;
            }
            if bucket.entries.len() > stats.max_bucket_size {
                stats.max_bucket_size = bucket.entries.len();
            }
        }
        stats
    }

    /// Log statistics summary via tracing
    pub fn print_summary(&self) {
        info!("Bucket Statistics:");
        info!("  Non-empty buckets: {}", self.num_buckets);
        info!("  Total keys: {}", self.num_keys);
        if self.num_buckets > 0 {
            info!(
                "  Singleton buckets: {} ({:.2}%)",
                self.num_singletons,
                (self.num_singletons as f64 * 100.0) / self.num_buckets as f64
            );
            info!("  Max bucket size: {}", self.max_bucket_size);
        }
    }
}
