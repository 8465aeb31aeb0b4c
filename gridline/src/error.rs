//! Error types

/// Errors raised by a persistence backend.
///
/// Controllers never surface these to their callers; they are logged and
/// treated as "no stored state".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored blob could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend cannot be reached (quota exceeded, storage disabled, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Errors raised by a log data source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The request reached the backend and failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend could not be reached.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The named archive does not exist.
    #[error("archive not found: {0}")]
    NotFound(String),
}

impl SourceError {
    /// Creates a request error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Unavailable(err.to_string()),
        }
    }
}
