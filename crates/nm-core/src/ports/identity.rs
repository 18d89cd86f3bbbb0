//! Identity provider port.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use super::errors::StorageError;
use crate::auth::{Session, SessionChange, User};
use crate::http::TransportError;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider unreachable: {0}")]
    Transport(#[from] TransportError),

    #[error("identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("identity provider returned an unexpected response: {0}")]
    InvalidResponse(String),

    #[error("no active session")]
    NoSession,

    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Stream of provider session changes. Dropping it unsubscribes.
///
/// 会话变更订阅；丢弃即取消订阅。
pub struct SessionSubscription {
    receiver: broadcast::Receiver<SessionChange>,
}

impl SessionSubscription {
    pub fn new(receiver: broadcast::Receiver<SessionChange>) -> Self {
        Self { receiver }
    }

    /// Next change, or `None` once the provider is gone.
    ///
    /// Changes overwritten while lagging are skipped; the newest one is
    /// still delivered.
    pub async fn recv(&mut self) -> Option<SessionChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[async_trait]
pub trait IdentityProviderPort: Send + Sync {
    /// Current session, if any.
    async fn get_session(&self) -> Result<Option<Session>, IdentityError>;

    /// Ask the provider who the current user is.
    async fn get_user(&self) -> Result<Option<User>, IdentityError>;

    fn subscribe(&self) -> SessionSubscription;

    /// Local session state changes only via the subscription.
    async fn sign_out(&self) -> Result<(), IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionEventKind;

    #[tokio::test]
    async fn subscription_skips_lag_and_ends_on_close() {
        let (tx, rx) = broadcast::channel(1);
        let mut subscription = SessionSubscription::new(rx);

        tx.send(SessionChange::new(SessionEventKind::SignedIn, None))
            .unwrap();
        tx.send(SessionChange::new(SessionEventKind::SignedOut, None))
            .unwrap();

        let change = subscription.recv().await.unwrap();
        assert_eq!(change.kind, SessionEventKind::SignedOut);

        drop(tx);
        assert!(subscription.recv().await.is_none());
    }
}
