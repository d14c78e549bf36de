mod content_queries;
mod error;
mod models;
mod share_queries;
mod tag_queries;
mod user_queries;

use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

pub use error::StoreError;
pub use models::{
    Content, ContentParams, ContentType, CreateUserParams, SharedContent, User,
};
pub use share_queries::SHARE_HASH_LEN;

/// Every storage call is bounded by the pool acquire timeout; hitting it
/// surfaces as the retryable `StoreError::Timeout`.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct Database(SqlitePool);

impl Database {
    pub async fn connect(database_url: &url::Url) -> Result<Self, DatabaseSetupError> {
        if database_url.scheme() != "sqlite" {
            return Err(DatabaseSetupError::UnknownDbType(
                database_url.scheme().to_string(),
            ));
        }

        let options = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(DatabaseSetupError::Unavailable)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        // An in-memory sqlite database exists per-connection, so the pool
        // must not hand out more than one.
        let max_connections = if database_url.as_str().contains(":memory:") {
            1
        } else {
            5
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(DatabaseSetupError::Unavailable)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DatabaseSetupError::MigrationFailed)?;

        Ok(Self(pool))
    }
}

impl Deref for Database {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseSetupError {
    #[error("error occurred while attempting database migration: {0}")]
    MigrationFailed(sqlx::migrate::MigrateError),

    #[error("unable to perform initial connection and check of the database: {0}")]
    Unavailable(sqlx::Error),

    #[error("requested database type was not recognized: {0}")]
    UnknownDbType(String),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) async fn setup_test_db() -> Database {
        let db_url = url::Url::parse("sqlite::memory:").unwrap();
        Database::connect(&db_url).await.unwrap()
    }

    #[tokio::test]
    async fn rejects_unknown_scheme() {
        let db_url = url::Url::parse("postgres://localhost/brainstash").unwrap();
        let err = Database::connect(&db_url).await.unwrap_err();
        assert!(matches!(err, DatabaseSetupError::UnknownDbType(_)));
    }
}
