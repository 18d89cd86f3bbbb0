use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// NomAI - session and data-access layer
#[derive(Parser, Debug)]
#[command(name = "nomai")]
#[command(about = "Session, connectivity and local data management for NomAI", long_about = None)]
pub struct Cli {
    /// Path to config.toml (defaults to the app data directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Track session and connectivity until Ctrl-C
    Run,
    /// Resolve the session once and print it
    Status,
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and clear local data
    Logout,
    /// Clear local data without signing out
    Purge,
}
