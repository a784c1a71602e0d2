//! Resolve an address to its connection.
//!
//! Local checks (config, address) run first so invalid requests never reach
//! the store. Exactly one bucket is then fetched and scanned in stored order:
//! the first range containing the address wins, even if a later range is
//! more specific.

use super::granularity::GroupBySettings;
use crate::error::{InputError, ResolveError, StoreError};
use crate::models::{classify, Address, ConnectionMapping, Resolution, StoredMapping};
use crate::store::{bucket_path, is_valid_bucket_key, BucketSource};

/// Look up `query` against the buckets of `source`.
///
/// # Arguments
/// * `query` - Untrusted address text, `None` when the caller sent none
/// * `settings` - Grouping used when the store was published
/// * `source` - Store holding the published config
///
/// # Returns
/// * `Ok(Resolution)` - The first matching connection, or `Unknown`
/// * `Err` - Invalid input, or a (redacted) store failure
pub async fn resolve<S: BucketSource>(
    query: Option<&str>,
    settings: &GroupBySettings,
    source: &S,
) -> Result<Resolution, ResolveError> {
    let address = classify(query.ok_or(InputError::Missing)?)?;
    log::info!("IP Address: {address}");

    let policy = settings.policy(address.family());
    let key = policy.bucket_for(address.text());
    if let Some(bad) = key.as_deref().filter(|k| !is_valid_bucket_key(k)) {
        // e.g. "::1" at 16 bits gives "", which would fetch the whole family
        log::info!("bucket key '{bad}' for {address} cannot exist, connection unknown");
        return Ok(Resolution::Unknown);
    }
    log::debug!(
        "derived bucket {path}",
        path = bucket_path(address.family(), key.as_deref())
    );

    let stored = match source.fetch_bucket(address.family(), key.as_deref()).await? {
        Some(stored) if !stored.is_empty() => stored,
        _ => {
            log::info!("no bucket for {address}, connection unknown");
            return Ok(Resolution::Unknown);
        }
    };

    let bucket = key.unwrap_or_else(|| address.family().to_string());
    let candidates = validate_bucket(&bucket, stored)?;
    let resolution = first_match(&address, &candidates);
    log::info!("{address} => {resolution}");
    Ok(resolution)
}

/// Parse every stored entry; one bad entry fails the whole bucket.
fn validate_bucket(
    bucket: &str,
    stored: Vec<StoredMapping>,
) -> Result<Vec<ConnectionMapping>, StoreError> {
    stored
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            ConnectionMapping::try_from(raw).map_err(|source| StoreError::MalformedEntry {
                bucket: bucket.to_string(),
                index,
                source,
            })
        })
        .collect()
}

/// First entry, in list order, whose range contains `address`.
pub fn first_match(address: &Address, candidates: &[ConnectionMapping]) -> Resolution {
    candidates
        .iter()
        // family check first: a v4 address is never inside a v6 range
        .filter(|m| m.cidr.family() == address.family())
        .find(|m| m.cidr.contains(address.ip()))
        .map(|m| Resolution::Connection(m.connection.clone()))
        .unwrap_or(Resolution::Unknown)
}
