use thiserror::Error;

use godsort_lib::{BatchError, SettingsError};

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The batch could not start
    #[error("{0}")]
    Batch(#[from] BatchError),

    /// Logger setup failed
    #[error("Logger error: {0}")]
    Logger(String),
}

impl CliError {
    pub(crate) fn logger(msg: impl Into<String>) -> Self {
        Self::Logger(msg.into())
    }
}
