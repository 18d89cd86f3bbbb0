//! GoTrue-compatible identity provider.
//!
//! Holds the current session in memory, persists it to the persistent
//! key-value store and broadcasts every change to subscribers.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use nm_core::auth::{Session, SessionChange, SessionEventKind, User, UserId};
use nm_core::http::{HttpRequest, HttpResponse};
use nm_core::ports::{
    ClockPort, HttpTransportPort, IdentityError, IdentityProviderPort, KeyValueStoragePort,
    SessionSubscription,
};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info, info_span, warn, Instrument};

/// Key under which the session JSON is persisted.
pub const SESSION_STORAGE_KEY: &str = "nomai-auth-token";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_SKEW_SECS: i64 = 60;

const CHANGE_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub struct GoTrueConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl GoTrueConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }
}

/// Result of a sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The provider auto-confirmed the account and issued a session.
    SignedIn(Session),
    /// The account exists but must be confirmed (e.g. by email) first.
    ConfirmationPending(User),
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<GoTrueUser> for User {
    fn from(user: GoTrueUser) -> Self {
        User {
            id: UserId::new(user.id),
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: GoTrueUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(at), _) => Utc.timestamp_opt(at, 0).single(),
            (None, Some(secs)) => Some(now + Duration::seconds(secs)),
            (None, None) => None,
        };
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at,
            user: self.user.into(),
        }
    }
}

/// GoTrue reports errors under several different keys depending on version.
fn error_message(response: &HttpResponse) -> String {
    let text = response.text();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    if text.is_empty() {
        format!("status {}", response.status)
    } else {
        text
    }
}

pub struct GoTrueIdentityProvider {
    config: GoTrueConfig,
    http: Arc<dyn HttpTransportPort>,
    storage: Arc<dyn KeyValueStoragePort>,
    clock: Arc<dyn ClockPort>,
    session: RwLock<Option<Session>>,
    changes: broadcast::Sender<SessionChange>,
}

impl GoTrueIdentityProvider {
    pub fn new(
        config: GoTrueConfig,
        http: Arc<dyn HttpTransportPort>,
        storage: Arc<dyn KeyValueStoragePort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            config: GoTrueConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key,
            },
            http,
            storage,
            clock,
            session: RwLock::new(None),
            changes,
        }
    }

    /// Load the persisted session into memory.
    ///
    /// A corrupt entry is dropped rather than reported: the user simply has
    /// to sign in again.
    pub async fn restore_persisted_session(&self) -> Result<Option<Session>, IdentityError> {
        let Some(raw) = self.storage.get(SESSION_STORAGE_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                debug!(user_id = %session.user.id, "restored persisted session");
                self.set_current(Some(session.clone()));
                Ok(Some(session))
            }
            Err(err) => {
                warn!(error = %err, "discarding unreadable persisted session");
                self.storage.remove(SESSION_STORAGE_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let span = info_span!("infra.gotrue.sign_in");
        async {
            let request = self
                .request(HttpRequest::post(
                    self.endpoint("/auth/v1/token?grant_type=password"),
                ))
                .json(&serde_json::json!({ "email": email, "password": password }))
                .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

            let response = self.send(&request).await?;
            let token: TokenResponse = response
                .json()
                .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
            let session = token.into_session(self.clock.now());

            self.store(Some(session.clone())).await;
            info!(user_id = %session.user.id, "signed in");
            self.publish(SessionEventKind::SignedIn, Some(session.clone()));
            Ok(session)
        }
        .instrument(span)
        .await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, IdentityError> {
        let span = info_span!("infra.gotrue.sign_up");
        async {
            let request = self
                .request(HttpRequest::post(self.endpoint("/auth/v1/signup")))
                .json(&serde_json::json!({ "email": email, "password": password }))
                .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

            let response = self.send(&request).await?;
            let value: serde_json::Value = response
                .json()
                .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

            // Without auto-confirm the provider answers with the bare user.
            if value.get("access_token").is_some() {
                let token: TokenResponse = serde_json::from_value(value)
                    .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
                let session = token.into_session(self.clock.now());
                self.store(Some(session.clone())).await;
                info!(user_id = %session.user.id, "signed up and signed in");
                self.publish(SessionEventKind::SignedIn, Some(session.clone()));
                Ok(SignUpOutcome::SignedIn(session))
            } else {
                let user: GoTrueUser = serde_json::from_value(value)
                    .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
                info!(user_id = %user.id, "signed up, confirmation pending");
                Ok(SignUpOutcome::ConfirmationPending(user.into()))
            }
        }
        .instrument(span)
        .await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn request(&self, request: HttpRequest) -> HttpRequest {
        request.header("apikey", self.config.anon_key.clone())
    }

    fn authorized(&self, request: HttpRequest, session: &Session) -> HttpRequest {
        self.request(request)
            .header("Authorization", format!("Bearer {}", session.access_token))
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, IdentityError> {
        let response = self.http.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(IdentityError::Rejected {
                status: response.status,
                message: error_message(&response),
            })
        }
    }

    fn current(&self) -> Option<Session> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_current(&self, session: Option<Session>) {
        match self.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    /// Replace the in-memory session and mirror it to persistent storage.
    async fn store(&self, session: Option<Session>) {
        self.set_current(session.clone());

        let persisted = match &session {
            Some(session) => match serde_json::to_string(session) {
                Ok(json) => self.storage.set(SESSION_STORAGE_KEY, &json).await,
                Err(err) => {
                    warn!(error = %err, "failed to serialize session");
                    return;
                }
            },
            None => self.storage.remove(SESSION_STORAGE_KEY).await,
        };
        if let Err(err) = persisted {
            warn!(error = %err, "failed to persist session");
        }
    }

    fn publish(&self, kind: SessionEventKind, session: Option<Session>) {
        // No subscribers is fine.
        let _ = self.changes.send(SessionChange::new(kind, session));
    }

    async fn refresh(&self, expired: &Session) -> Result<Option<Session>, IdentityError> {
        let request = self
            .request(HttpRequest::post(
                self.endpoint("/auth/v1/token?grant_type=refresh_token"),
            ))
            .json(&serde_json::json!({ "refresh_token": expired.refresh_token }))
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        match self.send(&request).await {
            Ok(response) => {
                let token: TokenResponse = response
                    .json()
                    .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
                let session = token.into_session(self.clock.now());
                self.store(Some(session.clone())).await;
                debug!(user_id = %session.user.id, "session refreshed");
                self.publish(SessionEventKind::TokenRefreshed, Some(session.clone()));
                Ok(Some(session))
            }
            Err(IdentityError::Rejected { status, message }) if (400..500).contains(&status) => {
                warn!(status, error = %message, "refresh token rejected, signing out locally");
                self.store(None).await;
                self.publish(SessionEventKind::SignedOut, None);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl IdentityProviderPort for GoTrueIdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>, IdentityError> {
        let Some(session) = self.current() else {
            return Ok(None);
        };

        if session.is_expired_at(self.clock.now(), Duration::seconds(REFRESH_SKEW_SECS)) {
            return self
                .refresh(&session)
                .instrument(info_span!("infra.gotrue.refresh"))
                .await;
        }
        Ok(Some(session))
    }

    async fn get_user(&self) -> Result<Option<User>, IdentityError> {
        let Some(session) = self.get_session().await? else {
            return Ok(None);
        };

        let request = self.authorized(HttpRequest::get(self.endpoint("/auth/v1/user")), &session);
        let response = self.send(&request).await?;
        let user: GoTrueUser = response
            .json()
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
        Ok(Some(user.into()))
    }

    fn subscribe(&self) -> SessionSubscription {
        SessionSubscription::new(self.changes.subscribe())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let span = info_span!("infra.gotrue.sign_out");
        async {
            if let Some(session) = self.current() {
                let request =
                    self.authorized(HttpRequest::post(self.endpoint("/auth/v1/logout")), &session);
                match self.send(&request).await {
                    Ok(_) => {}
                    // The server no longer knows this session; clear it locally.
                    Err(IdentityError::Rejected { status, .. })
                        if matches!(status, 401 | 403 | 404) =>
                    {
                        debug!(status, "session already invalid on the provider");
                    }
                    Err(err) => {
                        warn!(error = %err, "provider sign-out failed, keeping local session");
                        return Err(err);
                    }
                }
            }

            self.store(None).await;
            info!("signed out");
            self.publish(SessionEventKind::SignedOut, None);
            Ok(())
        }
        .instrument(span)
        .await
    }
}
