pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::{load_app_config, load_config, ConfigError};
pub use run::run_command;
pub use wiring::{wire_dependencies, WiredDependencies, WiringError};
