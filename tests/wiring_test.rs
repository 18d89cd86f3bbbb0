//! End-to-end checks of the assembled dependencies against a temp directory.

use std::fs;

use nm_app::App;
use nm_core::config::AppConfig;
use nm_core::ports::{AppDirsPort, KeyValueStoragePort};
use nm_infra::FileKeyValueStore;
use nm_platform::DirsAppDirsAdapter;
use nomai_lib::bootstrap::wire_dependencies;
use tempfile::TempDir;

fn offline_config() -> AppConfig {
    let mut config = AppConfig::default();
    // Nothing listens on the discard port.
    config.backend.url = "http://127.0.0.1:9".to_string();
    config.backend.anon_key = "eyJtest".to_string();
    config
}

#[tokio::test]
async fn purge_removes_only_application_stores() {
    let base = TempDir::new().unwrap();
    let dirs = DirsAppDirsAdapter::with_base_dir(base.path().to_path_buf());
    let config = offline_config();

    let wired = wire_dependencies(&config, &dirs).await.unwrap();
    let paths = wired.paths.clone();

    for store in ["NomAIDatabase", "nomai-meals", "keyval-store", "other-app"] {
        fs::create_dir_all(paths.stores_dir.join(store)).unwrap();
    }
    fs::create_dir_all(paths.cache_dir.join("api-responses")).unwrap();
    FileKeyValueStore::new(paths.kv_path.clone())
        .set("theme", "dark")
        .await
        .unwrap();

    let app = App::new(wired.deps, &config);
    let report = app.purge.execute().await;

    assert!(report.is_clean(), "{report:?}");
    let mut remaining: Vec<String> = fs::read_dir(&paths.stores_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    remaining.sort();
    assert_eq!(remaining, vec!["other-app".to_string()]);
    assert_eq!(fs::read_dir(&paths.cache_dir).unwrap().count(), 0);
    assert!(!paths.kv_path.exists());
}

#[tokio::test]
async fn paths_live_under_the_resolved_app_dirs() {
    let base = TempDir::new().unwrap();
    let dirs = DirsAppDirsAdapter::with_base_dir(base.path().to_path_buf());
    let app_dirs = dirs.get_app_dirs().unwrap();

    let wired = wire_dependencies(&offline_config(), &dirs).await.unwrap();

    assert!(wired.paths.kv_path.starts_with(&app_dirs.app_data_root));
    assert!(wired.paths.cache_dir.starts_with(&app_dirs.app_cache_root));
}

#[tokio::test]
async fn unreachable_backend_resolves_to_anonymous() {
    let base = TempDir::new().unwrap();
    let dirs = DirsAppDirsAdapter::with_base_dir(base.path().to_path_buf());
    let config = offline_config();

    let wired = wire_dependencies(&config, &dirs).await.unwrap();
    let app = App::new(wired.deps, &config);

    // No persisted session: the initial fetch resolves locally.
    let monitor = app.start().unwrap();
    let snapshot = app.session.wait_until_ready().await;

    assert!(!snapshot.is_authenticated());
    assert!(!snapshot.is_loading());
    app.session.shutdown();
    monitor.abort();
}
