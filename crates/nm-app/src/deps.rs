//! # Application Dependencies / 应用依赖
//!
//! Dependency grouping for [`App`](crate::App) construction. Plain parameter
//! bundle: no build steps, no defaults, no optional fields.
//!
//! 应用构造所需的依赖分组：仅用于参数打包，无默认值。

use std::sync::Arc;

use nm_core::ports::*;

pub struct AppDeps {
    // Remote collaborators / 远程协作方
    pub identity: Arc<dyn IdentityProviderPort>,
    pub profiles: Arc<dyn ProfileRepositoryPort>,
    pub http: Arc<dyn HttpTransportPort>,

    // Platform / 平台
    pub connectivity: Arc<dyn ConnectivitySignalPort>,
    pub notifier: Arc<dyn NotificationPort>,
    pub clock: Arc<dyn ClockPort>,

    // Local storage / 本地存储
    pub stores: Arc<dyn LocalStoreRegistryPort>,
    pub caches: Arc<dyn CacheStoragePort>,
    pub session_storage: Arc<dyn KeyValueStoragePort>,
    pub persistent_storage: Arc<dyn KeyValueStoragePort>,
}
