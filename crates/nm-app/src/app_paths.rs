use std::path::PathBuf;

use nm_core::app_dirs::AppDirs;

/// Concrete on-disk locations derived from the resolved app directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_path: PathBuf,
    pub logs_dir: PathBuf,
    /// Named local stores, one subdirectory each.
    pub stores_dir: PathBuf,
    /// Persistent key-value file.
    pub kv_path: PathBuf,
    /// Response-cache buckets, one subdirectory each.
    pub cache_dir: PathBuf,
}

impl AppPaths {
    pub fn from_app_dirs(dirs: &AppDirs) -> Self {
        Self {
            config_path: dirs.app_data_root.join("config.toml"),
            logs_dir: dirs.app_data_root.join("logs"),
            stores_dir: dirs.app_data_root.join("stores"),
            kv_path: dirs.app_data_root.join("local-storage.json"),
            cache_dir: dirs.app_cache_root.join("caches"),
        }
    }
}
