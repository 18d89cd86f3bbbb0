//! The one place where provider errors are mapped onto [`FailureKind`].
//!
//! Add new provider codes here rather than matching on messages at call sites.

use super::{ClassifiedError, FailureKind};
use crate::backend::BackendError;
use crate::http::TransportError;

/// Postgres codes that mean the query does not fit the deployed schema.
const SCHEMA_SQLSTATES: &[&str] = &[
    "42P01", // undefined_table
    "42703", // undefined_column
    "42883", // undefined_function
    "42601", // syntax_error
];

/// SQLSTATE classes that indicate a struggling server rather than a bad request.
const SERVER_SQLSTATE_CLASSES: &[&str] = &[
    "08", // connection_exception
    "53", // insufficient_resources
    "57", // operator_intervention
];

/// Classify an HTTP status. `None` means success.
pub fn classify_status(status: u16) -> Option<FailureKind> {
    match status {
        200..=299 => None,
        429 => Some(FailureKind::ServerError),
        400..=499 => Some(FailureKind::ClientError),
        _ => Some(FailureKind::ServerError),
    }
}

pub fn classify_transport(err: &TransportError) -> FailureKind {
    match err {
        TransportError::Timeout => FailureKind::Timeout,
        TransportError::Connect(_) | TransportError::Other(_) => FailureKind::NetworkError,
    }
}

/// Classify a backend error code, falling back to the HTTP status.
pub fn classify_backend_code(code: &str, status: Option<u16>) -> FailureKind {
    // Every PostgREST-level code describes the request itself; none are retried.
    if code.starts_with("PGRST") || SCHEMA_SQLSTATES.contains(&code) {
        return FailureKind::SchemaError;
    }

    if code.len() == 5
        && SERVER_SQLSTATE_CLASSES
            .iter()
            .any(|class| code.starts_with(class))
    {
        return FailureKind::ServerError;
    }

    status
        .and_then(classify_status)
        .unwrap_or(FailureKind::ServerError)
}

pub fn classify_backend_error(err: &BackendError) -> ClassifiedError {
    match err {
        BackendError::Response {
            code,
            message,
            status,
            ..
        } => {
            let kind = classify_backend_code(code, *status);
            let mut classified = ClassifiedError::new(kind, message.clone());
            if !code.is_empty() {
                classified = classified.with_code(code.clone());
            }
            if let Some(status) = status {
                classified = classified.with_status(*status);
            }
            classified
        }
        BackendError::Transport(transport) => {
            ClassifiedError::new(classify_transport(transport), transport.to_string())
        }
        BackendError::Decode(message) | BackendError::Configuration(message) => {
            ClassifiedError::new(FailureKind::SchemaError, message.clone())
        }
    }
}
