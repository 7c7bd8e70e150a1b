//! CLI error types
//!
//! Every CLI error is fatal: the process prints it and exits non-zero.

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, unreadable, or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or network I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server failed to boot
    #[error("Boot failed: {0}")]
    Boot(String),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a boot error
    pub fn boot(msg: impl Into<String>) -> Self {
        Self::Boot(msg.into())
    }
}
