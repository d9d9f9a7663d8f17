use common::{ErrorKind, Interrupted, InvalidObjectId};
use thiserror::Error;

/// Errors that can occur when interacting with a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller supplied malformed input, e.g. an identifier that is not 24 hex digits.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// A single-entity lookup found nothing.
    #[error("not found: {entity} {key}")]
    NotFound { entity: &'static str, key: String },

    /// The request was cancelled or its deadline passed while the call was in flight.
    #[error("{0}")]
    Interrupted(#[from] Interrupted),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Classification used by callers to pick a response.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::BadRequest { .. } => ErrorKind::BadRequest,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<InvalidObjectId> for StoreError {
    fn from(err: InvalidObjectId) -> Self {
        StoreError::BadRequest {
            message: err.to_string(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
