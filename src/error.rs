use thiserror::Error;

/// Errors that can occur while counting footfall.
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected at startup, before any frame is processed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A single detection that cannot be tracked. Recovered by dropping it.
    #[error("Malformed detection: {reason}")]
    MalformedDetection { reason: String },

    /// The detection source failed and cannot continue.
    #[error("Detection source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDetection {
            reason: reason.into(),
        }
    }
}

/// Result type for footfall operations.
pub type Result<T> = std::result::Result<T, Error>;
