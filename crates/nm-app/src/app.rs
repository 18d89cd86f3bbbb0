use std::sync::Arc;

use nm_core::ports::ConnectivitySignalPort;
use nm_core::AppConfig;
use tokio::task::JoinHandle;

use crate::context::AppContext;
use crate::deps::AppDeps;
use crate::usecases::{
    CheckOnboardingStatus, ConnectivityMonitor, PurgeLocalStores, PurgeLocalStoresDeps,
    ResilientQuery, ResilientRequest, SessionManager, SessionManagerDeps, SignOut,
};

/// The assembled session layer.
///
/// 组装完成的会话层。
pub struct App {
    pub context: Arc<AppContext>,
    pub session: Arc<SessionManager>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub request: Arc<ResilientRequest>,
    pub query: Arc<ResilientQuery>,
    pub purge: Arc<PurgeLocalStores>,
    signal_source: Arc<dyn ConnectivitySignalPort>,
}

impl App {
    /// This constructor signature IS the dependency manifest.
    /// 这个构造函数签名就是依赖清单。
    pub fn new(deps: AppDeps, config: &AppConfig) -> Self {
        let AppDeps {
            identity,
            profiles,
            http,
            connectivity,
            notifier,
            clock,
            stores,
            caches,
            session_storage,
            persistent_storage,
        } = deps;

        let context = Arc::new(AppContext::new());
        let query = Arc::new(ResilientQuery::new(context.clone()));
        let request = Arc::new(ResilientRequest::new(
            context.clone(),
            http,
            config.request_options(),
        ));
        let purge = Arc::new(PurgeLocalStores::from_deps(
            PurgeLocalStoresDeps {
                stores,
                caches,
                session_storage,
                persistent_storage,
                notifier: notifier.clone(),
            },
            config.store_namespace(),
        ));
        let check_onboarding = Arc::new(CheckOnboardingStatus::new(
            profiles,
            query.clone(),
            config.query_options(),
        ));
        let sign_out = Arc::new(SignOut::new(
            identity.clone(),
            purge.clone(),
            notifier.clone(),
        ));
        let session = Arc::new(SessionManager::new(
            SessionManagerDeps {
                context: context.clone(),
                identity,
                check_onboarding,
                sign_out,
            },
            config.init_timeout(),
        ));
        let monitor = Arc::new(ConnectivityMonitor::new(context.clone(), notifier, clock));

        Self {
            context,
            session,
            connectivity: monitor,
            request,
            query,
            purge,
            signal_source: connectivity,
        }
    }

    /// Start the connectivity monitor, then session tracking.
    pub fn start(&self) -> anyhow::Result<JoinHandle<()>> {
        let monitor_task = self.connectivity.spawn(self.signal_source.as_ref())?;
        self.session.initialize();
        Ok(monitor_task)
    }
}
