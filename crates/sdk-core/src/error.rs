//! Error types surfaced at the command-execution boundary

use thiserror::Error;

/// Errors returned by the SDK locator and streamed command execution
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("{name} was not found. Install it or set its location in the settings, then try again.")]
    ToolNotPresent { name: String },

    #[error("{name} version {version} is not supported. Version {minimum} or newer is required.")]
    VersionUnsupported {
        name: String,
        version: String,
        minimum: String,
    },

    #[error("Version check '{command}' failed: {status}")]
    VersionCheckFailed { command: String, status: String },

    #[error("Failed to run '{command}': {message}")]
    SpawnFailure { command: String, message: String },

    #[error("Command output exceeded the {limit} byte limit")]
    OutputBufferExceeded { limit: usize },

    #[error("Install prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0:#}")]
    Settings(#[from] anyhow::Error),
}

pub type Result<T, E = SdkError> = std::result::Result<T, E>;
