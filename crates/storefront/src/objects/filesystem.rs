//! Filesystem object store, served back over HTTP by the storefront server.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{validate_key, ObjectStore, StoredObject};
use crate::{Result, StorefrontError};

pub struct FilesystemObjectStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl FilesystemObjectStore {
    /// `public_base_url` is the URL prefix the directory is served under
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(&self, key: &str, content: Bytes, _content_type: &str) -> Result<StoredObject> {
        validate_key(key)?;
        let path = self.base_path.join(key);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| StorefrontError::ObjectStore(format!("failed to create {}: {}", key, e)))?;
        file.write_all(&content).await?;
        file.sync_all().await?;

        debug!("Stored {} bytes at {}", content.len(), path.display());

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size: content.len() as u64,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_file_and_builds_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemObjectStore::new(dir.path(), "http://localhost:3000/files/");

        let stored = store
            .put("123-notes.apk", Bytes::from_static(b"PK\x03\x04"), "application/octet-stream")
            .await
            .unwrap();

        assert_eq!(stored.url, "http://localhost:3000/files/123-notes.apk");
        assert_eq!(stored.size, 4);
        let written = std::fs::read(dir.path().join("123-notes.apk")).unwrap();
        assert_eq!(written, b"PK\x03\x04");
    }

    #[tokio::test]
    async fn test_put_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemObjectStore::new(dir.path(), "/files");

        store.put("same.apk", Bytes::from_static(b"one"), "application/octet-stream").await.unwrap();
        let second = store.put("same.apk", Bytes::from_static(b"two"), "application/octet-stream").await;
        assert!(matches!(second, Err(StorefrontError::ObjectStore(_))));
    }
}
