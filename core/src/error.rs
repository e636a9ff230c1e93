//! Error types for the portpilot-core library.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for portpilot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying the OS or terminating processes.
///
/// These never cross the capability boundary as-is: resolvers fold them into
/// [`crate::domain::Lookup`] and terminators into a plain `bool`.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to spawn or run a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// A system command exceeded the configured time budget.
    #[error("Command `{program}` timed out after {elapsed:?}")]
    Timeout { program: String, elapsed: Duration },

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
