//! CLI command implementations.

pub mod backend;
pub mod guard;

use roster_core::EmailError;
use roster_web::api::ApiError;
use roster_web::config::ConfigError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write a value to stdout as pretty JSON.
#[allow(clippy::print_stdout)]
pub fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
