//! Common error types for the harness

use thiserror::Error;

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors that can occur while driving a device under test
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The reference-player executable is missing from the install layout
    #[error("Reference player executable not found: {}", .0.display())]
    ExecutableNotFound(std::path::PathBuf),

    /// The OS refused to create the player process, or the player died
    /// before becoming addressable
    #[error("Failed to launch reference player: {0}")]
    ProcessLaunchFailed(String),

    /// Stop was called on a supervisor that is already stopped
    #[error("Reference player already stopped")]
    AlreadyStopped,

    /// A settings key was requested that the settings file does not define
    #[error("Configuration key not found: {0}")]
    ConfigKeyNotFound(String),

    /// The settings file could not be parsed
    #[error("Malformed settings file: {0}")]
    ConfigParse(String),

    /// An operation was invoked in a lifecycle state that forbids it
    #[error("Invalid supervisor state: {0}")]
    InvalidState(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
