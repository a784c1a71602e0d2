//! Configuration stores.
//!
//! This module handles fetching buckets and publishing generated config:
//! - [`firebase`] - Firebase Realtime Database over its REST API
//! - [`file`] - a generated JSON file on disk, for offline lookups

mod file;
mod firebase;

use crate::error::StoreError;
use crate::models::{IpFamily, StoredMapping};
use std::future::Future;

// Re-export public types and functions
pub use file::{read_root_config, JsonFileStore};
pub use firebase::FirebaseStore;

/// Source of candidate mapping lists for the resolver.
pub trait BucketSource {
    /// Fetch the list stored for `family` under `key`, or the family's flat
    /// list when `key` is `None`. An absent bucket is `Ok(None)`.
    ///
    /// Entries are returned raw; validating them is up to the caller.
    fn fetch_bucket(
        &self,
        family: IpFamily,
        key: Option<&str>,
    ) -> impl Future<Output = Result<Option<Vec<StoredMapping>>, StoreError>> + Send;
}

/// Store path of a bucket, e.g. `ipv4/83:29` or `ipv6`.
pub fn bucket_path(family: IpFamily, key: Option<&str>) -> String {
    match key {
        Some(key) => format!("{}/{}", family, key),
        None => family.to_string(),
    }
}

/// Characters Firebase does not allow in a key.
const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

/// Whether `key` can name a stored bucket.
///
/// Keys derived from published CIDRs are never empty and never contain a
/// forbidden character, so a key failing this check has no bucket.
pub fn is_valid_bucket_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(FORBIDDEN_KEY_CHARS)
}

/// Decode a bucket body; `null` means the bucket does not exist.
fn decode_bucket<'de, D>(path: &str, deserializer: D) -> Result<Option<Vec<StoredMapping>>, StoreError>
where
    D: serde::Deserializer<'de>,
{
    serde_path_to_error::deserialize(deserializer).map_err(|e| StoreError::Malformed {
        path: path.to_string(),
        reason: format!("path={} error={}", e.path(), e),
    })
}
