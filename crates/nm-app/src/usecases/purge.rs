//! Local store purge.
//!
//! Deletes every local store belonging to the application, every cache
//! bucket, and both key-value stores. Individual failures are collected, not
//! propagated; the caller always gets a report.

use std::sync::Arc;

use futures::future::join_all;
use nm_core::notification::Notification;
use nm_core::ports::{
    CacheStoragePort, KeyValueStoragePort, LocalStoreRegistryPort, NotificationPort, StorageError,
};
use nm_core::storage::StoreNamespace;
use tracing::{info, info_span, warn, Instrument};

const PURGE_WARNING: &str = "Some local data could not be cleared.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeFailure {
    pub target: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted_stores: Vec<String>,
    pub deleted_caches: Vec<String>,
    pub failures: Vec<PurgeFailure>,
}

impl PurgeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted_stores.len() + self.deleted_caches.len()
    }

    fn record_failure(&mut self, target: impl Into<String>, error: &StorageError) {
        self.failures.push(PurgeFailure {
            target: target.into(),
            error: error.to_string(),
        });
    }
}

/// Dependencies of [`PurgeLocalStores`].
pub struct PurgeLocalStoresDeps {
    pub stores: Arc<dyn LocalStoreRegistryPort>,
    pub caches: Arc<dyn CacheStoragePort>,
    pub session_storage: Arc<dyn KeyValueStoragePort>,
    pub persistent_storage: Arc<dyn KeyValueStoragePort>,
    pub notifier: Arc<dyn NotificationPort>,
}

pub struct PurgeLocalStores {
    stores: Arc<dyn LocalStoreRegistryPort>,
    caches: Arc<dyn CacheStoragePort>,
    session_storage: Arc<dyn KeyValueStoragePort>,
    persistent_storage: Arc<dyn KeyValueStoragePort>,
    notifier: Arc<dyn NotificationPort>,
    namespace: StoreNamespace,
}

impl PurgeLocalStores {
    pub fn from_deps(deps: PurgeLocalStoresDeps, namespace: StoreNamespace) -> Self {
        let PurgeLocalStoresDeps {
            stores,
            caches,
            session_storage,
            persistent_storage,
            notifier,
        } = deps;

        Self {
            stores,
            caches,
            session_storage,
            persistent_storage,
            notifier,
            namespace,
        }
    }

    /// Purge everything. Safe to call when nothing is left.
    pub async fn execute(&self) -> PurgeReport {
        let span = info_span!("usecase.purge_local_stores.execute");
        async {
            let mut report = PurgeReport::default();

            if let Err(err) = self.session_storage.clear().await {
                warn!(error = %err, "failed to clear session storage");
                report.record_failure("session-storage", &err);
            }
            if let Err(err) = self.persistent_storage.clear().await {
                warn!(error = %err, "failed to clear persistent storage");
                report.record_failure("local-storage", &err);
            }

            self.purge_stores(&mut report).await;
            self.purge_caches(&mut report).await;

            if report.is_clean() {
                info!(
                    stores = report.deleted_stores.len(),
                    caches = report.deleted_caches.len(),
                    "local data purged"
                );
            } else {
                warn!(
                    failures = report.failures.len(),
                    deleted = report.deleted_count(),
                    "local data purge incomplete"
                );
                self.notifier.notify(Notification::warning(PURGE_WARNING));
            }

            report
        }
        .instrument(span)
        .await
    }

    async fn purge_stores(&self, report: &mut PurgeReport) {
        let names = match self.stores.list_stores().await {
            Ok(names) => names,
            Err(err) => {
                warn!(error = %err, "failed to enumerate local stores");
                report.record_failure("stores", &err);
                return;
            }
        };

        let targets: Vec<String> = names
            .into_iter()
            .filter(|name| self.namespace.matches(name))
            .collect();
        let results = join_all(targets.iter().map(|name| self.stores.delete_store(name))).await;

        for (name, result) in targets.into_iter().zip(results) {
            match result {
                Ok(()) => report.deleted_stores.push(name),
                Err(err) => {
                    warn!(store = %name, error = %err, "failed to delete local store");
                    report.record_failure(name, &err);
                }
            }
        }
    }

    async fn purge_caches(&self, report: &mut PurgeReport) {
        let buckets = match self.caches.list_buckets().await {
            Ok(buckets) => buckets,
            Err(err) => {
                warn!(error = %err, "failed to enumerate cache buckets");
                report.record_failure("caches", &err);
                return;
            }
        };

        // The cache root is private to this application; every bucket goes.
        let results = join_all(buckets.iter().map(|name| self.caches.delete_bucket(name))).await;

        for (name, result) in buckets.into_iter().zip(results) {
            match result {
                Ok(()) => report.deleted_caches.push(name),
                Err(err) => {
                    warn!(bucket = %name, error = %err, "failed to delete cache bucket");
                    report.record_failure(name, &err);
                }
            }
        }
    }
}
