use std::sync::Arc;

use nm_core::notification::Notification;
use nm_core::ports::{IdentityError, IdentityProviderPort, NotificationPort};
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};

use crate::usecases::purge::{PurgeLocalStores, PurgeReport};

#[derive(Debug, Error)]
pub enum SignOutError {
    #[error("identity provider sign-out failed: {0}")]
    Provider(#[from] IdentityError),
}

/// Use case for signing the user out.
///
/// Delegates to the identity provider and then purges local data. Session
/// and onboarding state are not touched here; they change when the provider
/// delivers its `SIGNED_OUT` notification.
pub struct SignOut {
    identity: Arc<dyn IdentityProviderPort>,
    purge: Arc<PurgeLocalStores>,
    notifier: Arc<dyn NotificationPort>,
}

impl SignOut {
    pub fn new(
        identity: Arc<dyn IdentityProviderPort>,
        purge: Arc<PurgeLocalStores>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            identity,
            purge,
            notifier,
        }
    }

    pub async fn execute(&self) -> Result<PurgeReport, SignOutError> {
        let span = info_span!("usecase.sign_out.execute");
        async {
            if let Err(err) = self.identity.sign_out().await {
                warn!(error = %err, "provider sign-out failed, local data kept");
                self.notifier
                    .notify(Notification::error("Sign out failed. Please try again."));
                return Err(SignOutError::Provider(err));
            }

            let report = self.purge.execute().await;
            self.notifier.notify(Notification::success("Signed out"));
            info!(purged = report.deleted_count(), clean = report.is_clean(), "signed out");
            Ok(report)
        }
        .instrument(span)
        .await
    }
}
