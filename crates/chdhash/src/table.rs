//! The immutable lookup table.
//!
//! A [`Table`] holds the two level arrays produced by the displacement
//! search plus the membership oracle. It is born fully formed from the
//! builder (or from [`Table::from_bytes`](crate::Table::from_bytes)), never
//! mutated, and freely shared: lookups are pure reads with no suspension
//! points, so any number of threads may query one table concurrently.

use crate::constants::LEVEL_ENTRY_BYTES;
use crate::hasher::placement_hash;
use crate::membership::MembershipOracle;

/// A minimal perfect hash table over a static key set.
///
/// Maps every original input key to its position in the input slice;
/// queries for other keys return `None`, up to the membership oracle's
/// false-positive rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Per-bucket displacement seeds; unused slots hold 0.
    level0: Vec<u32>,
    /// Original key index per occupied slot; unoccupied slots hold
    /// whatever the construction left behind.
    level1: Vec<u32>,
    membership: MembershipOracle,
}

impl Table {
    pub(crate) fn new(level0: Vec<u32>, level1: Vec<u32>, membership: MembershipOracle) -> Self {
        Self {
            level0,
            level1,
            membership,
        }
    }

    /// The legal table for an empty key set.
    pub(crate) fn empty(membership: MembershipOracle) -> Self {
        Self::new(Vec::new(), Vec::new(), membership)
    }

    /// Look up a key and return its index in the original input.
    ///
    /// The first hash picks the key's bucket and with it the seed that
    /// placed the bucket; the second, seeded hash picks the level-1 slot
    /// holding the candidate index. The membership oracle then decides
    /// whether the candidate is trustworthy: for never-seen keys the slot
    /// contents are arbitrary.
    #[inline]
    pub fn lookup(&self, key: impl AsRef<[u8]>) -> Option<u32> {
        let key = key.as_ref();
        if self.level0.is_empty() || self.level1.is_empty() {
            return None;
        }
        let i0 = placement_hash(0, key) as usize % self.level0.len();
        let seed = self.level0[i0];
        let i1 = placement_hash(seed, key) as usize % self.level1.len();
        let candidate = self.level1[i1];
        if self.membership.verify(candidate, key) {
            Some(candidate)
        } else {
            None
        }
    }

    /// Whether the table was built from an empty key set.
    pub fn is_empty(&self) -> bool {
        self.level1.is_empty()
    }

    /// Approximate resident footprint: both level arrays plus the oracle
    /// payload.
    pub fn size_in_bytes(&self) -> usize {
        (self.level0.len() + self.level1.len()) * LEVEL_ENTRY_BYTES + self.membership.payload_len()
    }

    pub(crate) fn level0(&self) -> &[u32] {
        &self.level0
    }

    pub(crate) fn level1(&self) -> &[u32] {
        &self.level1
    }

    pub(crate) fn membership(&self) -> &MembershipOracle {
        &self.membership
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_lookup() {
        let table = Table::empty(MembershipOracle::Fingerprints(Vec::new()));
        assert!(table.is_empty());
        assert_eq!(table.lookup("anything"), None);
        assert_eq!(table.lookup(""), None);
    }

    #[test]
    fn test_lookup_is_pure() {
        let table = crate::build(&["x", "y", "z"], 1.0).unwrap();
        let first = table.lookup("y");
        for _ in 0..10 {
            assert_eq!(table.lookup("y"), first);
        }
    }

    #[test]
    fn test_size_in_bytes() {
        let table = crate::build(&["x", "y", "z"], 1.0).unwrap();
        // Three level-1 entries, at least one level-0 entry, three
        // fingerprints.
        assert!(table.size_in_bytes() >= 3 * 4 + 4 + 3 * 8);
    }
}
