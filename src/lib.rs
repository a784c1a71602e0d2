//! Resolve IP addresses to named connections using CIDR ranges grouped into
//! address-prefix buckets.
//!
//! - [`processing`] - grouping, lookup and mock data
//! - [`store`] - Firebase and local JSON stores
//! - [`input`] / [`output`] - CSV mappings in, JSON config out

pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod processing;
pub mod store;

use config::RuntimeConfig;
use error::ResolveError;
use models::{IpFamily, Resolution};
use processing::{
    build_root, find_shadowed_mappings, log_shadowed_mappings, GroupBySettings, RootConfig,
};
use std::error::Error;
use store::FirebaseStore;

/// Resolve `query` with the store named in a runtime config string.
///
/// The config is parsed first; the address is validated by
/// [`processing::resolve`] before any request is made. Store failures come
/// back as [`ResolveError::ServiceUnavailable`].
///
/// # Arguments
/// * `raw_config` - `<endpoint>|<secret>|<ipv4GroupBy>|<ipv6GroupBy>`
/// * `query` - Address text, `None` when the caller sent none
pub async fn lookup(
    raw_config: Option<&str>,
    query: Option<&str>,
) -> Result<Resolution, ResolveError> {
    let config = RuntimeConfig::parse(raw_config)?;
    let settings = config.group_by();
    let store = FirebaseStore::from_config(&config)?;
    processing::resolve(query, &settings, &store).await
}

/// Build a config from a mapping CSV.
///
/// Shadowed entries are reported as warnings but kept, since removing them
/// would not change any lookup result.
pub fn generate_config(input: &str, settings: &GroupBySettings) -> Result<RootConfig, Box<dyn Error>> {
    let (ipv4, ipv6) = input::read_mapping_csv(input)?;
    let root = build_root(ipv4, ipv6, settings);
    report_shadowed(&root);
    Ok(root)
}

/// Log entries that can never match, per family.
pub fn report_shadowed(root: &RootConfig) {
    for family in [IpFamily::Ipv4, IpFamily::Ipv6] {
        let shadowed = find_shadowed_mappings(family, root.family(family));
        log_shadowed_mappings(family, &shadowed);
    }
}

/// Overwrite the remote store root with `root`.
pub async fn deploy(endpoint: &str, secret: &str, root: &RootConfig) -> Result<(), Box<dyn Error>> {
    let store = FirebaseStore::new(endpoint, secret)?;
    store.put_root(root).await.map_err(|e| {
        log::error!("Deploy failed: {e}");
        format!("Deploy to {endpoint} failed")
    })?;
    log::info!("Deployed config to {endpoint}");
    Ok(())
}
