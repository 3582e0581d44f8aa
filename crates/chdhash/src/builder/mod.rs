//! Builder module for constructing lookup tables
//!
//! The build pipeline:
//! 1. Populate the membership oracle from the key list
//! 2. Partition keys into level-0 buckets by the primary hash
//! 3. Order buckets by size, largest first
//! 4. Displace each bucket into level-1 by per-bucket seed search
//! 5. On seed exhaustion, decay the load factor and start over

pub mod buckets;
pub mod config;
pub mod table_builder;

pub use config::{BuildConfiguration, MembershipKind};
pub use table_builder::{BuildError, TableBuilder};
