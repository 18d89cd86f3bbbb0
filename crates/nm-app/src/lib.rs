//! NomAI session layer orchestration.
//!
//! Use cases and long-lived coordinators built on the ports of `nm-core`.

pub mod app;
pub mod app_paths;
pub mod context;
pub mod deps;
pub mod usecases;

pub use app::App;
pub use app_paths::AppPaths;
pub use context::AppContext;
pub use deps::AppDeps;
