// Error taxonomy for writers, relay messages and configuration

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReporterError {
    /// A writer name that is not present in the registry
    #[error("unknown writer '{0}'")]
    UnknownWriter(String),

    #[error("invalid arguments for writer '{name}': {reason}")]
    InvalidWriterArgs { name: String, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("message bus is closed")]
    BusClosed,

    #[error("unsupported relay message '{0}'")]
    UnsupportedMessage(String),

    #[error("invalid test plan {}: {reason}", path.display())]
    InvalidTestPlan { path: PathBuf, reason: String },

    #[error("invalid configuration {}: {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },
}

impl ReporterError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ReporterError> = std::result::Result<T, E>;
