//! Local JSON store.
//!
//! Serves buckets out of a generated config file so lookups can be checked
//! without a network.

use super::{bucket_path, decode_bucket, BucketSource};
use crate::error::StoreError;
use crate::models::{IpFamily, StoredMapping};
use crate::processing::RootConfig;
use std::path::Path;

/// Read a generated root config file.
///
/// # Arguments
/// * `file` - Path to a JSON file in the store layout
///
/// # Returns
/// * `Ok(RootConfig)` - Validated config
/// * `Err` - If the file is missing or any entry fails to parse
pub fn read_root_config(file: &str) -> Result<RootConfig, StoreError> {
    let json = std::fs::read_to_string(file)?;
    log::info!("Reading config file: {file}");
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| StoreError::Malformed {
        path: file.to_string(),
        reason: format!("path={} error={}", e.path(), e),
    })
}

/// [`BucketSource`] backed by an in-memory copy of the stored root.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: serde_json::Value,
}

impl JsonFileStore {
    /// Load a store file; entries are only validated when fetched.
    pub fn open(file: &str) -> Result<JsonFileStore, StoreError> {
        if !Path::new(file).exists() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Config file does not exist: {file}"),
            )));
        }
        let json = std::fs::read_to_string(file)?;
        log::info!("Using config file: {file}");
        let root = serde_json::from_str(&json).map_err(|e| StoreError::Malformed {
            path: file.to_string(),
            reason: e.to_string(),
        })?;
        Ok(JsonFileStore { root })
    }

    pub fn from_value(root: serde_json::Value) -> JsonFileStore {
        JsonFileStore { root }
    }

    pub fn from_root(root: &RootConfig) -> Result<JsonFileStore, StoreError> {
        let root = serde_json::to_value(root).map_err(|e| StoreError::Malformed {
            path: "/".to_string(),
            reason: e.to_string(),
        })?;
        Ok(JsonFileStore { root })
    }
}

impl BucketSource for JsonFileStore {
    async fn fetch_bucket(
        &self,
        family: IpFamily,
        key: Option<&str>,
    ) -> Result<Option<Vec<StoredMapping>>, StoreError> {
        let path = bucket_path(family, key);
        let family_value = self.root.get(family.as_str());
        let value = match key {
            Some(key) => family_value.and_then(|v| v.get(key)),
            None => family_value,
        };
        match value {
            Some(value) => decode_bucket(&path, value.clone()),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_16_32: &str = "src/tests/test_data/group-by-ipv4_16-ipv6_32.json";

    #[test]
    fn test_read_root_config() {
        let root = read_root_config(FIXTURE_16_32).expect("Error reading config file");
        assert_eq!(root.ipv4.len(), 3);
        assert_eq!(root.ipv6.len(), 3);
    }

    #[test]
    fn test_read_root_config_missing() {
        let err = read_root_config("src/tests/test_data/does_not_exist.json").unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[tokio::test]
    async fn test_fetch_bucket_grouped() {
        let store = JsonFileStore::open(FIXTURE_16_32).expect("Error opening store");
        let bucket = store
            .fetch_bucket(IpFamily::Ipv6, Some("200b:af16"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].connection, "fabrikam-adfs-6");
        assert!(store
            .fetch_bucket(IpFamily::Ipv4, Some("83:30"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_bucket_flat() {
        let store = JsonFileStore::open("src/tests/test_data/group-by-none.json")
            .expect("Error opening store");
        let list = store.fetch_bucket(IpFamily::Ipv4, None).await.unwrap().unwrap();
        assert_eq!(list.len(), 3);
        // a grouped lookup against a flat store finds nothing
        assert!(store
            .fetch_bucket(IpFamily::Ipv4, Some("83:29"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_bucket_malformed() {
        let store = JsonFileStore::from_value(serde_json::json!({"ipv4": {"83:29": "oops"}}));
        let err = store
            .fetch_bucket(IpFamily::Ipv4, Some("83:29"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }
}
