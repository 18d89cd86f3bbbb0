use std::path::PathBuf;

use async_trait::async_trait;
use nm_core::ports::{LocalStoreRegistryPort, StorageError};
use tracing::debug;

use super::{list_entry_names, remove_entry};

/// Named structured stores kept under one directory.
pub struct FsLocalStoreRegistry {
    root: PathBuf,
}

impl FsLocalStoreRegistry {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl LocalStoreRegistryPort for FsLocalStoreRegistry {
    async fn list_stores(&self) -> Result<Vec<String>, StorageError> {
        list_entry_names(&self.root).await
    }

    async fn delete_store(&self, name: &str) -> Result<(), StorageError> {
        remove_entry(&self.root, name).await?;
        debug!(store = name, "local store deleted");
        Ok(())
    }
}
