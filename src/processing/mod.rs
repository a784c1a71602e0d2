//! Mapping processing logic.
//!
//! This module contains the business logic for building and querying configs:
//! - [`granularity`] - Grouping levels and bucket key derivation
//! - [`grouping`] - Building flat or bucketed configs
//! - [`dedup`] - De-duplication of CIDR entries
//! - [`overlap`] - Finding entries hidden by earlier ranges
//! - [`mock`] - Random non-overlapping test data
//! - [`resolver`] - Address to connection lookup

mod dedup;
mod granularity;
mod grouping;
mod mock;
mod overlap;
mod resolver;

// Re-export public types and functions
pub use dedup::{de_duplicate_mappings, partition_by_family};
pub use granularity::{
    bucket_key, GroupBySettings, GroupingPolicy, Ipv4GroupBy, Ipv6GroupBy, BUCKET_KEY_SEPARATOR,
    IPV4_GROUP_BY_OPTIONS, IPV6_GROUP_BY_OPTIONS,
};
pub use grouping::{build, build_root, GroupedConfig, RootConfig};
pub use mock::{fixture_mappings, generate_mappings, generate_mock_root};
pub use overlap::{find_shadowed_mappings, log_shadowed_mappings, ShadowedMapping};
pub use resolver::{first_match, resolve};
