use std::path::PathBuf;

use async_trait::async_trait;
use nm_core::ports::{CacheStoragePort, StorageError};
use tracing::debug;

use super::{list_entry_names, remove_entry};

/// Response-cache buckets inside the application's own cache directory.
pub struct FsCacheStorage {
    root: PathBuf,
}

impl FsCacheStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl CacheStoragePort for FsCacheStorage {
    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        list_entry_names(&self.root).await
    }

    async fn delete_bucket(&self, name: &str) -> Result<(), StorageError> {
        remove_entry(&self.root, name).await?;
        debug!(bucket = name, "cache bucket deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deletes_every_bucket() {
        let dir = tempfile::tempdir().unwrap();
        for bucket in ["api-responses", "images"] {
            std::fs::create_dir(dir.path().join(bucket)).unwrap();
            std::fs::write(dir.path().join(bucket).join("entry"), b"cached").unwrap();
        }

        let caches = FsCacheStorage::new(dir.path().to_path_buf());
        for bucket in caches.list_buckets().await.unwrap() {
            caches.delete_bucket(&bucket).await.unwrap();
        }

        assert!(caches.list_buckets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_names_outside_the_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let caches = FsCacheStorage::new(dir.path().join("caches"));

        assert!(caches.delete_bucket("../config.toml").await.is_err());
    }
}
