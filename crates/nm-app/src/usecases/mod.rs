//! Business logic use cases
//!
//! ```text
//! [platform signals] → ConnectivityMonitor ──reconnect──┐
//!                                                       ↓
//! [identity provider] ──session changes──→ SessionManager → SessionSnapshot (watch)
//!                                             ↓
//!                          CheckOnboardingStatus → ResilientQuery → profiles
//!                          SignOut → PurgeLocalStores
//! ```

pub mod connectivity;
pub mod purge;
pub mod resilient;
pub mod session;

pub use connectivity::ConnectivityMonitor;
pub use purge::{PurgeFailure, PurgeLocalStores, PurgeLocalStoresDeps, PurgeReport};
pub use resilient::{ResilientQuery, ResilientRequest};
pub use session::{CheckOnboardingStatus, SessionManager, SessionManagerDeps, SignOut, SignOutError};
