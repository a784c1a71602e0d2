//! Firebase Realtime Database access over REST.
//!
//! Reads fetch a single bucket (`GET {endpoint}/ipv4/83:29.json`), deploys
//! overwrite the whole root (`PUT {endpoint}/.json`). The secret goes in the
//! `auth` query parameter and is never logged.

use super::{bucket_path, decode_bucket, BucketSource};
use crate::config::{RuntimeConfig, STORE_TIMEOUT_SECS};
use crate::error::StoreError;
use crate::models::{IpFamily, StoredMapping};
use crate::processing::RootConfig;
use std::fmt;
use std::time::Duration;

pub struct FirebaseStore {
    endpoint: String,
    secret: String,
    client: reqwest::Client,
}

impl FirebaseStore {
    pub fn new(endpoint: &str, secret: &str) -> Result<FirebaseStore, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(STORE_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Transport(e.without_url()))?;
        Ok(FirebaseStore {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
            client,
        })
    }

    pub fn from_config(config: &RuntimeConfig) -> Result<FirebaseStore, StoreError> {
        FirebaseStore::new(&config.endpoint, &config.secret)
    }

    /// REST url for a store path, without credentials.
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            // root lives at "/.json"; appending to the host would change it
            format!("{}/.json", self.endpoint)
        } else {
            format!("{}/{}.json", self.endpoint, path)
        }
    }

    /// Overwrite the store root with `root`.
    pub async fn put_root(&self, root: &RootConfig) -> Result<(), StoreError> {
        let body = serde_json::to_string(root).map_err(|e| StoreError::Malformed {
            path: "/".to_string(),
            reason: e.to_string(),
        })?;
        let url = self.url("");
        log::info!("PUT {url} ({} bytes)", body.len());
        let response = self
            .client
            .put(&url)
            .query(&[("auth", &self.secret)])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.without_url()))?;
        if !response.status().is_success() {
            return Err(StoreError::Status {
                status: response.status().as_u16(),
                path: url,
            });
        }
        Ok(())
    }
}

impl BucketSource for FirebaseStore {
    async fn fetch_bucket(
        &self,
        family: IpFamily,
        key: Option<&str>,
    ) -> Result<Option<Vec<StoredMapping>>, StoreError> {
        let path = bucket_path(family, key);
        let url = self.url(&path);
        log::debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .query(&[("auth", &self.secret)])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.without_url()))?;
        if !response.status().is_success() {
            return Err(StoreError::Status {
                status: response.status().as_u16(),
                path: url,
            });
        }
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.without_url()))?;
        log::debug!("got {} bytes for {path}", body.len());
        let mut deserializer = serde_json::Deserializer::from_str(&body);
        decode_bucket(&path, &mut deserializer)
    }
}

impl fmt::Debug for FirebaseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseStore")
            .field("endpoint", &self.endpoint)
            .field("secret", &"***")
            .finish()
    }
}
