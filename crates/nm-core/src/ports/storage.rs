//! Local persistent storage ports.
//!
//! 本地持久化存储端口：命名存储、缓存桶与键值存储。

use async_trait::async_trait;

use super::errors::StorageError;

/// Enumerates and deletes named local stores (structured databases).
#[async_trait]
pub trait LocalStoreRegistryPort: Send + Sync {
    async fn list_stores(&self) -> Result<Vec<String>, StorageError>;

    /// Deleting a store that no longer exists succeeds.
    async fn delete_store(&self, name: &str) -> Result<(), StorageError>;
}

/// Enumerates and deletes response-cache buckets.
#[async_trait]
pub trait CacheStoragePort: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<String>, StorageError>;

    /// Deleting a bucket that no longer exists succeeds.
    async fn delete_bucket(&self, name: &str) -> Result<(), StorageError>;
}

/// String key-value storage (session-scoped or persistent).
#[async_trait]
pub trait KeyValueStoragePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
    async fn clear(&self) -> Result<(), StorageError>;
}
