use std::path::PathBuf;

use thiserror::Error;

/// The lister's output did not contain what classification needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    /// No trailing `total <N> bytes` line
    #[error("no total-size summary line in listing")]
    MissingSummary,

    /// The summary reported a zero-byte image
    #[error("listing reports a zero-byte image")]
    ZeroImageSize,
}

/// Errors raised while invoking an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The executable could not be started
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure
    #[error("{tool} exited with {status}")]
    Failed { tool: String, status: String },

    /// Unparseable tool output
    #[error("{0}")]
    Listing(#[from] ListingError),

    /// I/O error around the invocation (reading output, scanning results)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    pub fn spawn(tool: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            tool: tool.into(),
            source,
        }
    }

    pub fn failed(tool: impl Into<String>, status: impl ToString) -> Self {
        Self::Failed {
            tool: tool.into(),
            status: status.to_string(),
        }
    }
}

/// Errors that abort a batch before any image is touched.
#[derive(Debug, Error)]
pub enum BatchError {
    /// One or more tools or data files are missing
    #[error("missing prerequisites: {}", .0.join(", "))]
    MissingPrerequisites(Vec<String>),

    /// The source directory could not be listed
    #[error("cannot read source directory {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory is missing or unreadable
    #[error("cannot use output directory {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The gamelist could not be loaded
    #[error("gamelist error: {0}")]
    Gamelist(#[from] godsort_gamelist::GamelistError),
}

/// Errors while reading or writing the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Invalid(#[from] godsort_core::CoreError),
}
