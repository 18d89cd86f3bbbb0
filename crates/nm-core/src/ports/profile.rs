use async_trait::async_trait;

use crate::auth::UserId;
use crate::backend::BackendError;

/// Structured data backend holding per-user onboarding flags.
#[async_trait]
pub trait ProfileRepositoryPort: Send + Sync {
    /// `Ok(None)` when the user has no profile record yet.
    async fn fetch_onboarding(&self, user_id: &UserId) -> Result<Option<bool>, BackendError>;

    /// Create `{id, is_onboarded: false}`. Must be idempotent.
    async fn create_default_profile(&self, user_id: &UserId) -> Result<(), BackendError>;
}
