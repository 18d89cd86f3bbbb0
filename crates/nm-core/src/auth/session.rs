use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Provider-issued user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// Opaque credential bundle issued by the identity provider.
///
/// Replaced wholesale on every provider-delivered change; never patched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    /// Whether the access token should be considered expired at `now`,
    /// treating anything inside `skew` of the deadline as already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => now + skew >= expires_at,
            None => false,
        }
    }
}

// Tokens never reach logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Why a session change was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEventKind {
    /// Result of the fetch issued during initialization.
    InitialFetch,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    /// Re-fetch triggered by a connectivity reconnect.
    Reconnected,
}

impl SessionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEventKind::InitialFetch => "INITIAL_FETCH",
            SessionEventKind::SignedIn => "SIGNED_IN",
            SessionEventKind::SignedOut => "SIGNED_OUT",
            SessionEventKind::TokenRefreshed => "TOKEN_REFRESHED",
            SessionEventKind::UserUpdated => "USER_UPDATED",
            SessionEventKind::Reconnected => "RECONNECTED",
        }
    }
}

impl fmt::Display for SessionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A session transition as delivered by the provider, the initial fetch or
/// a reconnect re-fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    pub kind: SessionEventKind,
    pub session: Option<Session>,
}

impl SessionChange {
    pub fn new(kind: SessionEventKind, session: Option<Session>) -> Self {
        Self { kind, session }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session_expiring_at(expires_at: Option<DateTime<Utc>>) -> Session {
        Session {
            access_token: "access-secret".to_string(),
            refresh_token: "refresh-secret".to_string(),
            token_type: "bearer".to_string(),
            expires_at,
            user: User::new("user-1"),
        }
    }

    #[test]
    fn session_without_expiry_never_expires() {
        let session = session_expiring_at(None);
        assert!(!session.is_expired_at(Utc::now(), Duration::seconds(60)));
    }

    #[test]
    fn session_is_expired_inside_skew_window() {
        let deadline = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let session = session_expiring_at(Some(deadline));

        let well_before = deadline - Duration::seconds(120);
        let inside_skew = deadline - Duration::seconds(30);

        assert!(!session.is_expired_at(well_before, Duration::seconds(60)));
        assert!(session.is_expired_at(inside_skew, Duration::seconds(60)));
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let session = session_expiring_at(None);
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("access-secret"));
        assert!(!rendered.contains("refresh-secret"));
        assert!(rendered.contains("user-1"));
    }

    #[test]
    fn session_round_trips_through_json_with_defaults() {
        let json = r#"{"access_token":"a","refresh_token":"r","user":{"id":"u-9"}}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.user_id(), &UserId::from("u-9"));
        assert_eq!(session.user.email, None);
    }

    #[test]
    fn event_kind_labels_match_provider_vocabulary() {
        assert_eq!(SessionEventKind::InitialFetch.to_string(), "INITIAL_FETCH");
        assert_eq!(SessionEventKind::Reconnected.as_str(), "RECONNECTED");
    }
}
