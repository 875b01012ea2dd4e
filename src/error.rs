//! Error types for tcc-runner.

use thiserror::Error;

/// Main error type for tcc-runner operations.
#[derive(Error, Debug)]
pub enum TccRunnerError {
    /// The host platform has no known compiler layout and the strict
    /// platform policy is in effect.
    #[error("platform {0} not supported")]
    UnsupportedPlatform(String),

    /// PTY-related error.
    #[error("PTY error: {0}")]
    Pty(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No terminal session has been created yet.
    #[error("no terminal session")]
    NoSession,

    /// Static configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type for tcc-runner operations.
pub type Result<T> = std::result::Result<T, TccRunnerError>;
