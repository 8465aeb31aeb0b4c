//! CLI error type.

use gridline::{SourceError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no data directory available; pass --db")]
    NoDataDir,

    #[error("{0}")]
    InvalidArgument(String),
}

impl CliError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
