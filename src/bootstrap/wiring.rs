//! # Dependency Injection / 依赖注入模块
//!
//! The only place that depends on nm-infra, nm-platform and nm-app at once.
//! Assembly only: no decisions, no validation.
//!
//! 唯一同时依赖 infra、platform 与 app 的地方；只负责组装，不做决策。

use std::sync::Arc;

use nm_app::{AppDeps, AppPaths};
use nm_core::config::{AppConfig, ConnectivityConfig};
use nm_core::ports::{AppDirsError, AppDirsPort};
use nm_infra::{
    FileKeyValueStore, FsCacheStorage, FsLocalStoreRegistry, GoTrueConfig,
    GoTrueIdentityProvider, MemoryKeyValueStore, PostgrestProfileRepository, ReqwestTransport,
    SystemClock,
};
use nm_platform::{TcpProbeConfig, TcpReachabilityProbe, TracingNotifier};
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, warn};

pub type WiringResult<T> = Result<T, WiringError>;

/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("App directories unavailable: {0}")]
    AppDirs(#[from] AppDirsError),

    #[error("HTTP client initialization failed: {0}")]
    HttpClient(String),
}

/// Everything the commands need.
///
/// The concrete identity provider is kept next to the port-typed deps for
/// the sign-in and sign-up commands, which the session layer does not own.
pub struct WiredDependencies {
    pub deps: AppDeps,
    pub identity: Arc<GoTrueIdentityProvider>,
    pub paths: AppPaths,
}

/// Probe the configured host, or the backend's own host and port.
pub fn resolve_probe_config(connectivity: &ConnectivityConfig, backend_url: &str) -> TcpProbeConfig {
    let (host, port) = if !connectivity.probe_host.is_empty() {
        (connectivity.probe_host.clone(), connectivity.probe_port)
    } else {
        match Url::parse(backend_url) {
            Ok(url) => (
                url.host_str().unwrap_or_default().to_string(),
                url.port_or_known_default().unwrap_or(connectivity.probe_port),
            ),
            Err(_) => (String::new(), connectivity.probe_port),
        }
    };

    TcpProbeConfig {
        host,
        port,
        interval: Duration::from_millis(connectivity.probe_interval_ms),
        timeout: Duration::from_millis(connectivity.probe_timeout_ms),
    }
}

pub async fn wire_dependencies(
    config: &AppConfig,
    app_dirs: &dyn AppDirsPort,
) -> WiringResult<WiredDependencies> {
    let paths = AppPaths::from_app_dirs(&app_dirs.get_app_dirs()?);
    debug!(?paths, "resolved app paths");

    // Infra / 基础设施
    let http = Arc::new(
        ReqwestTransport::new(config.backend_timeout())
            .map_err(|e| WiringError::HttpClient(e.to_string()))?,
    );
    let clock = Arc::new(SystemClock);
    let persistent_storage = Arc::new(FileKeyValueStore::new(paths.kv_path.clone()));
    let session_storage = Arc::new(MemoryKeyValueStore::new());

    let identity = Arc::new(GoTrueIdentityProvider::new(
        GoTrueConfig::new(config.backend.url.clone(), config.backend.anon_key.clone()),
        http.clone(),
        persistent_storage.clone(),
        clock.clone(),
    ));
    if let Err(err) = identity.restore_persisted_session().await {
        warn!(error = %err, "could not restore persisted session");
    }

    let profiles = Arc::new(PostgrestProfileRepository::new(
        config.backend.url.clone(),
        config.backend.anon_key.clone(),
        http.clone(),
        identity.clone(),
    ));

    // Platform / 平台
    let connectivity = Arc::new(TcpReachabilityProbe::new(resolve_probe_config(
        &config.connectivity,
        &config.backend.url,
    )));
    let notifier = Arc::new(TracingNotifier::new());

    let deps = AppDeps {
        identity: identity.clone(),
        profiles,
        http,
        connectivity,
        notifier,
        clock,
        stores: Arc::new(FsLocalStoreRegistry::new(paths.stores_dir.clone())),
        caches: Arc::new(FsCacheStorage::new(paths.cache_dir.clone())),
        session_storage,
        persistent_storage,
    };

    Ok(WiredDependencies {
        deps,
        identity,
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_defaults_to_backend_host_and_port() {
        let probe = resolve_probe_config(&ConnectivityConfig::default(), "https://abc.supabase.co");
        assert_eq!(probe.host, "abc.supabase.co");
        assert_eq!(probe.port, 443);

        let local = resolve_probe_config(&ConnectivityConfig::default(), "http://127.0.0.1:54321");
        assert_eq!(local.host, "127.0.0.1");
        assert_eq!(local.port, 54321);
    }

    #[test]
    fn explicit_probe_host_wins() {
        let connectivity = ConnectivityConfig {
            probe_host: "1.1.1.1".to_string(),
            probe_port: 53,
            ..ConnectivityConfig::default()
        };

        let probe = resolve_probe_config(&connectivity, "https://abc.supabase.co");

        assert_eq!((probe.host.as_str(), probe.port), ("1.1.1.1", 53));
        assert_eq!(probe.interval, Duration::from_millis(5000));
    }

    #[test]
    fn unusable_backend_url_leaves_host_empty() {
        let probe = resolve_probe_config(&ConnectivityConfig::default(), "");
        assert!(probe.host.is_empty());
    }

    #[test]
    fn wiring_error_display() {
        let err = WiringError::HttpClient("tls backend unavailable".to_string());
        assert!(err.to_string().contains("HTTP client initialization"));
    }
}
