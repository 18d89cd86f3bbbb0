use std::sync::Arc;

use nm_core::ports::ProfileRepositoryPort;
use nm_core::{FailureKind, QueryOptions, UserId};
use tracing::{error, info, info_span, warn, Instrument};

use crate::usecases::resilient::ResilientQuery;

/// Use case for resolving a user's onboarding flag.
///
/// Always resolves to a boolean. A user without a profile record gets a
/// default `{is_onboarded: false}` record created as a side effect.
///
/// 查询用户引导状态；没有记录时创建默认记录。任何失败都视为未完成引导。
pub struct CheckOnboardingStatus {
    profiles: Arc<dyn ProfileRepositoryPort>,
    query: Arc<ResilientQuery>,
    options: QueryOptions,
}

impl CheckOnboardingStatus {
    pub fn new(
        profiles: Arc<dyn ProfileRepositoryPort>,
        query: Arc<ResilientQuery>,
        options: QueryOptions,
    ) -> Self {
        Self {
            profiles,
            query,
            options,
        }
    }

    pub async fn execute(&self, user_id: &UserId) -> bool {
        let span = info_span!("usecase.check_onboarding_status.execute", user_id = %user_id);
        async {
            let profiles = &self.profiles;
            let fetched = self
                .query
                .execute("profiles.fetch_onboarding", self.options, || {
                    profiles.fetch_onboarding(user_id)
                })
                .await;

            match fetched {
                Ok(Some(onboarded)) => {
                    info!(onboarded, "onboarding status resolved");
                    onboarded
                }
                Ok(None) => {
                    info!("no profile record, creating default");
                    let created = self
                        .query
                        .execute("profiles.create_default", self.options, || {
                            profiles.create_default_profile(user_id)
                        })
                        .await;
                    if let Err(err) = created {
                        warn!(kind = %err.kind, error = %err.message, "failed to create default profile");
                    }
                    false
                }
                Err(err) if err.kind == FailureKind::SchemaError => {
                    error!(
                        code = err.code.as_deref().unwrap_or(""),
                        error = %err.message,
                        "profiles table is missing or misconfigured; treating user as not onboarded"
                    );
                    false
                }
                Err(err) => {
                    warn!(kind = %err.kind, error = %err.message, "onboarding lookup failed");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }
}
