//! Domain error taxonomy for the storage layer.
//!
//! Correctness under concurrency is enforced by storage uniqueness
//! constraints (owner+title, tag title, share hash, email); any write that
//! trips one is caught here and translated to a domain error rather than
//! bubbling up as a raw database failure.

use http::StatusCode;

/// Errors that can occur when working with the content store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unexpected persistence failure
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Pool acquire timed out; the caller may retry
    #[error("storage timed out, retry the request")]
    Timeout,

    /// Entity absent
    #[error("not found")]
    NotFound,

    /// Valid credential, wrong owner
    #[error("forbidden")]
    Forbidden,

    /// Another item owned by the same user already has this title
    #[error("a content item with this title already exists")]
    DuplicateTitle,

    /// Another user already signed up with this email
    #[error("a user with this email already exists")]
    EmailTaken,

    /// Share hash generation kept colliding; practically unreachable
    #[error("could not allocate a unique share hash")]
    HashSpaceExhausted,
}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::NotFound => StatusCode::NOT_FOUND,
            StoreError::Forbidden => StatusCode::FORBIDDEN,
            StoreError::DuplicateTitle | StoreError::EmailTaken => StatusCode::CONFLICT,
            StoreError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Database(_) | StoreError::HashSpaceExhausted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            other => StoreError::Database(other),
        }
    }
}

/// True when the error is a sqlite UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
