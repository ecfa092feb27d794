//! Object store backends for uploaded package binaries.

mod filesystem;
mod supabase;

pub use filesystem::FilesystemObjectStore;
pub use supabase::SupabaseObjectStore;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{Result, StorefrontError};

/// Where a stored blob ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Publicly retrievable URL
    pub url: String,
    pub size: u64,
}

/// Key-addressed blob storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store content under `key`; an existing key is an error
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<StoredObject>;

    fn public_url(&self, key: &str) -> String;
}

/// Reject keys that could escape the bucket or address a directory
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.ends_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        return Err(StorefrontError::ObjectStore(format!("invalid object key '{}'", key)));
    }
    Ok(())
}
