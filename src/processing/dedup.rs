//! Mapping de-duplication.
//!
//! Handles removing repeated CIDRs before a config is grouped.

use crate::models::{ConnectionMapping, IpFamily};
use std::collections::HashMap;

/// De-duplicate mappings by CIDR string, keeping the first occurrence.
///
/// Order of the kept entries is unchanged, since it decides match precedence.
/// A repeat that maps to a different connection is logged; it could never
/// match anyway.
///
/// # Arguments
/// * `mappings` - Entries in source order
///
/// # Returns
/// The entries with later repeats removed
pub fn de_duplicate_mappings(mut mappings: Vec<ConnectionMapping>) -> Vec<ConnectionMapping> {
    let original_count = mappings.len();
    let mut seen: HashMap<String, String> = HashMap::new();

    mappings.retain(|m| match seen.get(m.cidr.as_str()) {
        None => {
            seen.insert(m.cidr.to_string(), m.connection.clone());
            true
        }
        Some(first) => {
            if first != &m.connection {
                log::warn!(
                    "Dropping duplicate CIDR {} => '{}', already mapped to '{}'",
                    m.cidr,
                    m.connection,
                    first
                );
            }
            false
        }
    });

    let removed = original_count - mappings.len();
    if removed > 0 {
        log::info!("Removed {removed} duplicate CIDR entries");
    }
    mappings
}

/// Split mappings into (IPv4, IPv6) lists, each in source order.
pub fn partition_by_family(
    mappings: Vec<ConnectionMapping>,
) -> (Vec<ConnectionMapping>, Vec<ConnectionMapping>) {
    mappings
        .into_iter()
        .partition(|m| m.cidr.family() == IpFamily::Ipv4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(cidr: &str, conn: &str) -> ConnectionMapping {
        ConnectionMapping::new(cidr, conn).unwrap()
    }

    #[test]
    fn test_de_duplicate_mappings_keeps_first() {
        let result = de_duplicate_mappings(vec![
            m("83.29.4.2/16", "fabrikam-adfs"),
            m("99.2.4.28/32", "contoso-ping"),
            m("83.29.4.2/16", "fabrikam-other"),
            m("83.29.4.2/16", "fabrikam-adfs"),
        ]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].connection, "fabrikam-adfs");
        assert_eq!(result[1].connection, "contoso-ping");
    }

    #[test]
    fn test_de_duplicate_mappings_is_textual() {
        // same network, different text: both kept
        let result = de_duplicate_mappings(vec![
            m("83.29.4.2/16", "fabrikam-adfs"),
            m("83.29.0.0/16", "fabrikam-adfs"),
        ]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_de_duplicate_mappings_empty() {
        assert!(de_duplicate_mappings(vec![]).is_empty());
    }

    #[test]
    fn test_partition_by_family() {
        let (v4, v6) = partition_by_family(vec![
            m("200b:af16:a83f:c7be:dd00:d9fb:ddc3:92aa/40", "fabrikam-adfs-6"),
            m("83.29.4.2/16", "fabrikam-adfs"),
            m("eaf5:59b7:ee1f:e78a:d5bd:a5e6:251b:7d29/64", "ms-azuread-6"),
            m("99.2.4.28/32", "contoso-ping"),
        ]);
        assert_eq!(
            v4.iter().map(|e| e.connection.as_str()).collect::<Vec<_>>(),
            vec!["fabrikam-adfs", "contoso-ping"]
        );
        assert_eq!(
            v6.iter().map(|e| e.connection.as_str()).collect::<Vec<_>>(),
            vec!["fabrikam-adfs-6", "ms-azuread-6"]
        );
    }
}
