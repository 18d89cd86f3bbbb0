//! Structured data backend error type.
//!
//! Backend operations return `Result<T, BackendError>` instead of panicking;
//! the error half carries the provider's code so it can be classified.

use serde::Deserialize;
use thiserror::Error;

use crate::http::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend answered with an error payload.
    #[error("backend error {code}: {message}")]
    Response {
        code: String,
        message: String,
        status: Option<u16>,
        details: Option<String>,
        hint: Option<String>,
    },

    /// Nothing usable came back.
    #[error("backend unreachable: {0}")]
    Transport(#[from] TransportError),

    /// The response did not match the expected shape.
    #[error("backend response could not be decoded: {0}")]
    Decode(String),

    /// The request could not be built from local configuration.
    #[error("backend misconfigured: {0}")]
    Configuration(String),
}

impl BackendError {
    pub fn response(code: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Response {
            code: code.into(),
            message: message.into(),
            status: None,
            details: None,
            hint: None,
        }
    }

    /// Build from an error body, falling back to the status when the body
    /// carries no code.
    pub fn from_body(status: u16, body: BackendErrorBody) -> Self {
        BackendError::Response {
            code: body.code.unwrap_or_default(),
            message: body
                .message
                .unwrap_or_else(|| format!("request failed with status {status}")),
            status: Some(status),
            details: body.details,
            hint: body.hint,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            BackendError::Response { code, .. } if !code.is_empty() => Some(code),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Response { status, .. } => *status,
            _ => None,
        }
    }
}

/// Error payload shape `{code, message, details, hint}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}
