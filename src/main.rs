//! NomAI session layer command-line entry point.
//!
//! All logic lives in the library.

use clap::Parser;
use nomai_lib::bootstrap;
use nomai_lib::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_app_config(cli.config.clone())?;

    if let Err(err) = bootstrap::tracing::init_tracing_subscriber() {
        eprintln!("Failed to initialize tracing: {err}");
    }
    bootstrap::config::log_credential_issues(&config);

    bootstrap::run::run_command(cli.command, config).await
}
