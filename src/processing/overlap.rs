//! Shadowed range detection.
//!
//! Lookups take the first range that matches, so an entry placed after a
//! range that already covers it can never be returned. These are reported at
//! publish time so operators can fix the ordering.

use super::grouping::GroupedConfig;
use crate::models::{ConnectionMapping, IpFamily};

/// An entry hidden behind an earlier, wider entry in the same bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedMapping {
    /// Bucket key, or the family name for a flat list.
    pub bucket: String,
    pub shadowed: ConnectionMapping,
    pub covered_by: ConnectionMapping,
}

/// Find entries that can never match under first-match lookups.
///
/// # Arguments
/// * `family` - Family of `config`, used to label a flat list
/// * `config` - Grouped mappings for one family
///
/// # Returns
/// A list of shadowed entries in bucket order
pub fn find_shadowed_mappings(family: IpFamily, config: &GroupedConfig) -> Vec<ShadowedMapping> {
    let lists: Vec<(String, &Vec<ConnectionMapping>)> = match config {
        GroupedConfig::Flat(list) => vec![(family.to_string(), list)],
        GroupedConfig::Buckets(buckets) => buckets.iter().map(|(k, v)| (k.clone(), v)).collect(),
    };

    let mut shadowed = Vec::new();
    for (bucket, list) in lists {
        for (j, later) in list.iter().enumerate() {
            if let Some(earlier) = list[..j].iter().find(|e| e.cidr.covers(&later.cidr)) {
                shadowed.push(ShadowedMapping {
                    bucket: bucket.clone(),
                    shadowed: later.clone(),
                    covered_by: earlier.clone(),
                });
            }
        }
    }
    shadowed
}

/// Log shadowed entries as warnings.
pub fn log_shadowed_mappings(family: IpFamily, shadowed: &[ShadowedMapping]) {
    if shadowed.is_empty() {
        log::info!("No shadowed {family} ranges found.");
        return;
    }

    log::warn!(
        "Found {} {family} range(s) that can never match:",
        shadowed.len()
    );
    for s in shadowed {
        log::warn!(
            "  bucket '{}': {} is covered by earlier {}",
            s.bucket,
            s.shadowed,
            s.covered_by
        );
    }
}
