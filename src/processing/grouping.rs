//! Partition mapping lists into prefix buckets.

use super::granularity::{GroupBySettings, GroupingPolicy};
use crate::models::{ConnectionMapping, IpFamily};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mappings for one family, either flat or keyed by bucket.
///
/// Entry order inside a list is match precedence and is always the source
/// order. Bucket keys are kept sorted only so the output is stable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum GroupedConfig {
    Flat(Vec<ConnectionMapping>),
    Buckets(BTreeMap<String, Vec<ConnectionMapping>>),
}

impl Default for GroupedConfig {
    fn default() -> Self {
        GroupedConfig::Flat(vec![])
    }
}

impl GroupedConfig {
    /// Candidate list for a lookup; `None` selects the flat list.
    pub fn bucket(&self, key: Option<&str>) -> Option<&[ConnectionMapping]> {
        match (self, key) {
            (GroupedConfig::Flat(list), None) => Some(list),
            (GroupedConfig::Buckets(buckets), Some(key)) => buckets.get(key).map(|v| v.as_slice()),
            _ => None,
        }
    }

    /// All entries, bucket by bucket, each bucket in stored order.
    pub fn flatten(&self) -> Vec<&ConnectionMapping> {
        match self {
            GroupedConfig::Flat(list) => list.iter().collect(),
            GroupedConfig::Buckets(buckets) => buckets.values().flatten().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            GroupedConfig::Flat(list) => list.len(),
            GroupedConfig::Buckets(buckets) => buckets.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buckets, 1 for a flat list.
    pub fn bucket_count(&self) -> usize {
        match self {
            GroupedConfig::Flat(_) => 1,
            GroupedConfig::Buckets(buckets) => buckets.len(),
        }
    }
}

/// Group `mappings` by the policy's bucket key.
///
/// A stable partition: entries keep their relative order within a bucket.
/// With a flat policy the list is returned unchanged.
pub fn build(mappings: Vec<ConnectionMapping>, policy: &GroupingPolicy) -> GroupedConfig {
    if !policy.is_grouped() {
        return GroupedConfig::Flat(mappings);
    }
    let mut buckets: BTreeMap<String, Vec<ConnectionMapping>> = BTreeMap::new();
    for mapping in mappings {
        buckets
            .entry(policy.bucket_key(mapping.cidr.as_str()))
            .or_default()
            .push(mapping);
    }
    log::debug!(
        "grouped {family} mappings by {bits} bits into {count} buckets",
        family = policy.family(),
        bits = policy.label(),
        count = buckets.len()
    );
    GroupedConfig::Buckets(buckets)
}

/// Stored root: one [`GroupedConfig`] per family.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RootConfig {
    // Firebase drops empty collections, so a family may be missing
    #[serde(default)]
    pub ipv4: GroupedConfig,
    #[serde(default)]
    pub ipv6: GroupedConfig,
}

impl RootConfig {
    pub fn family(&self, family: IpFamily) -> &GroupedConfig {
        match family {
            IpFamily::Ipv4 => &self.ipv4,
            IpFamily::Ipv6 => &self.ipv6,
        }
    }
}

/// Build the stored root from per-family lists.
pub fn build_root(
    ipv4: Vec<ConnectionMapping>,
    ipv6: Vec<ConnectionMapping>,
    settings: &GroupBySettings,
) -> RootConfig {
    RootConfig {
        ipv4: build(ipv4, settings.policy(IpFamily::Ipv4)),
        ipv6: build(ipv6, settings.policy(IpFamily::Ipv6)),
    }
}
