//! NomAI client binary support: CLI definition and bootstrap.

pub mod bootstrap;
pub mod cli;
