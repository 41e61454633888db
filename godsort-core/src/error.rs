use thiserror::Error;

/// Errors raised while constructing core domain values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A string could not be used as a title id
    #[error("Invalid title id: {0:?}")]
    InvalidTitleId(String),

    /// A classifier threshold is out of range
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
}

impl CoreError {
    pub fn invalid_title_id(value: impl Into<String>) -> Self {
        Self::InvalidTitleId(value.into())
    }

    pub fn invalid_threshold(msg: impl Into<String>) -> Self {
        Self::InvalidThreshold(msg.into())
    }
}
