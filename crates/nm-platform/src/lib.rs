//! # nm-platform
//!
//! Platform-specific implementations for the NomAI client.
//!
//! This crate contains adapters that talk to the operating system:
//! directory resolution, network reachability and user-facing notifications.

pub mod app_dirs;
pub mod connectivity;
pub mod notification;

pub use app_dirs::DirsAppDirsAdapter;
pub use connectivity::{TcpProbeConfig, TcpReachabilityProbe};
pub use notification::TracingNotifier;
