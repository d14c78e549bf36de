use std::sync::Arc;

use url::Url;

use crate::config::Config;
use crate::database::{Database, DatabaseSetupError};

/// Main service state - the database handle plus the immutable config,
/// cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    database: Database,
    config: Arc<Config>,
}

impl AppState {
    pub async fn from_config(config: Config) -> Result<Self, StateSetupError> {
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => Url::parse(&format!("sqlite://{}", path.display()))
                .map_err(|_| StateSetupError::InvalidDatabaseUrl),
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!(url = %sqlite_database_url, "connecting to database");

        let database = Database::connect(&sqlite_database_url).await?;

        Ok(Self {
            database,
            config: Arc::new(config),
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("database setup error: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("invalid database URL")]
    InvalidDatabaseUrl,
}
