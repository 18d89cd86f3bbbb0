//! # nm-core
//!
//! Core domain models and business logic for the NomAI client session layer.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod app_dirs;
pub mod auth;
pub mod backend;
pub mod config;
pub mod connectivity;
pub mod failure;
pub mod http;
pub mod notification;
pub mod ports;
pub mod profile;
pub mod retry;
pub mod storage;

// Re-export commonly used types at the crate root
pub use auth::{AuthState, Session, SessionChange, SessionEventKind, SessionSnapshot, User, UserId};
pub use backend::BackendError;
pub use config::AppConfig;
pub use failure::{ClassifiedError, FailureKind};
pub use retry::{QueryOptions, RequestOptions};
