//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases in `nm-app` and the
//! adapters in `nm-infra` / `nm-platform`. Use cases hold `Arc<dyn ...Port>`
//! and never name a concrete adapter.
//!
//! ## Port Placement Guidelines
//!
//! A trait belongs here when it stands for an external collaborator (identity
//! provider, data backend, platform signal source, local storage) and is
//! implemented outside `nm-core`. Pure helpers stay in their domain module.

pub mod app_dirs;
mod clock;
pub mod connectivity;
pub mod errors;
pub mod http;
pub mod identity;
pub mod notification;
pub mod profile;
pub mod storage;

pub use app_dirs::AppDirsPort;
pub use clock::*;
pub use connectivity::ConnectivitySignalPort;
pub use errors::{AppDirsError, StorageError};
pub use http::HttpTransportPort;
pub use identity::{IdentityError, IdentityProviderPort, SessionSubscription};
pub use notification::NotificationPort;
pub use profile::ProfileRepositoryPort;
pub use storage::{CacheStoragePort, KeyValueStoragePort, LocalStoreRegistryPort};
