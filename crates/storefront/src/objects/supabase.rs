//! Hosted storage bucket (`/storage/v1/object`).

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use super::{validate_key, ObjectStore, StoredObject};
use crate::{Result, StorefrontError};

pub struct SupabaseObjectStore {
    client: Client,
    storage_url: String,
    bucket: String,
    service_key: String,
}

impl SupabaseObjectStore {
    pub fn new(project_url: &str, service_key: &str, bucket: &str) -> Self {
        Self {
            client: Client::new(),
            storage_url: format!("{}/storage/v1", project_url.trim_end_matches('/')),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for SupabaseObjectStore {
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<StoredObject> {
        validate_key(key)?;
        let size = content.len() as u64;
        let url = format!("{}/object/{}/{}", self.storage_url, self.bucket, key);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
            .header("apikey", &self.service_key)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(content)
            .send()
            .await
            .map_err(|e| StorefrontError::ObjectStore(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorefrontError::ObjectStore(format!(
                "upload of {} failed with {}: {}",
                key, status, body
            )));
        }

        debug!("Uploaded {} ({} bytes) to bucket {}", key, size, self.bucket);

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.storage_url, self.bucket, key)
    }
}
