//! Directory-backed local stores and cache buckets.
//!
//! 每个命名存储或缓存桶对应根目录下的一个条目（目录或文件）。

mod cache_storage;
mod store_registry;

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use nm_core::ports::StorageError;

pub use cache_storage::FsCacheStorage;
pub use store_registry::FsLocalStoreRegistry;

/// Names of the entries directly under `root`, sorted. A missing root is empty.
async fn list_entry_names(root: &Path) -> Result<Vec<String>, StorageError> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Resolve `name` to a direct child of `root`, refusing anything that would
/// escape it.
fn entry_path(root: &Path, name: &str) -> Result<PathBuf, StorageError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(root.join(name)),
        _ => Err(StorageError::Io(format!("invalid entry name: {name:?}"))),
    }
}

/// Remove the entry `name` under `root`. Already gone is success.
async fn remove_entry(root: &Path, name: &str) -> Result<(), StorageError> {
    let path = entry_path(root, name)?;

    let metadata = match tokio::fs::symlink_metadata(&path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    let removed = if metadata.is_dir() {
        tokio::fs::remove_dir_all(&path).await
    } else {
        tokio::fs::remove_file(&path).await
    };

    match removed {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
