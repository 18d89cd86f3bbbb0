use std::path::PathBuf;

/// Resolved per-user application directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub app_data_root: PathBuf,
    pub app_cache_root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn app_dirs_is_pure_fact_container() {
        let dirs = AppDirs {
            app_data_root: PathBuf::from("/tmp/nomai"),
            app_cache_root: PathBuf::from("/tmp/cache/nomai"),
        };
        assert!(dirs.app_data_root.ends_with("nomai"));
        assert!(dirs.app_cache_root.ends_with("nomai"));
    }
}
