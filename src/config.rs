use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable holding the process-wide token signing secret.
/// Startup fails fast when it is absent.
pub const JWT_SECRET_ENV: &str = "BRAINSTASH_JWT_SECRET";

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Immutable process configuration, constructed once at startup and passed
/// explicitly to each component.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on
    pub listen_addr: SocketAddr,
    /// Path to a sqlite database; if not set then an in-memory database
    /// will be used
    pub sqlite_path: Option<PathBuf>,
    /// Shared secret for signing and verifying bearer tokens
    pub jwt_secret: String,
    /// Validity window for issued tokens
    pub token_ttl_hours: i64,
    /// Log level for the process and http tracing
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env(
        listen_addr: SocketAddr,
        sqlite_path: Option<PathBuf>,
        log_level: tracing::Level,
    ) -> Result<Self, ConfigError> {
        let jwt_secret = std::env::var(JWT_SECRET_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        Ok(Self {
            listen_addr,
            sqlite_path,
            jwt_secret,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            log_level,
        })
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{JWT_SECRET_ENV} must be set to a non-empty signing secret")]
    MissingJwtSecret,
}
