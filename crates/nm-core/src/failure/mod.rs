//! Failure taxonomy shared by every network-facing component.
//!
//! Raw transport or provider errors never leave the retry wrappers; callers
//! only ever see a [`ClassifiedError`].

mod classify;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use classify::{
    classify_backend_code, classify_backend_error, classify_status, classify_transport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Device reported offline before the call.
    Offline,
    /// An attempt exceeded its deadline.
    Timeout,
    /// 4xx other than 429.
    ClientError,
    /// 5xx or 429.
    ServerError,
    /// DNS, TLS, reset and other transport failures.
    NetworkError,
    /// Backend definition problem (missing table/column, malformed query).
    SchemaError,
}

impl FailureKind {
    /// Retryable kinds are presumed transient.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            FailureKind::Timeout | FailureKind::ServerError | FailureKind::NetworkError
        )
    }

    pub fn code(self) -> &'static str {
        match self {
            FailureKind::Offline => "OFFLINE",
            FailureKind::Timeout => "TIMEOUT",
            FailureKind::ClientError => "CLIENT_ERROR",
            FailureKind::ServerError => "SERVER_ERROR",
            FailureKind::NetworkError => "NETWORK_ERROR",
            FailureKind::SchemaError => "SCHEMA_ERROR",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A failure after classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClassifiedError {
    pub kind: FailureKind,
    pub message: String,
    /// HTTP status, when one was received.
    pub status: Option<u16>,
    /// Provider-specific code, when one was received.
    pub code: Option<String>,
}

impl ClassifiedError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn offline() -> Self {
        Self::new(FailureKind::Offline, "network offline")
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
