use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Revision conflict: {0}")]
    RevisionConflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store error (HTTP {status}): {message}")]
    StoreError { status: u16, message: String },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl MigrationError {
    /// True when the store rejected a transaction because a document changed
    /// after it was fetched. Re-running the migration is the recovery path.
    pub fn is_revision_conflict(&self) -> bool {
        matches!(self, Self::RevisionConflict(_))
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;

impl From<reqwest::Error> for MigrationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::DecodeError(err.to_string())
        } else {
            Self::TransportError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}
