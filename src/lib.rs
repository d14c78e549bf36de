pub mod auth;
pub mod config;
pub mod database;
pub mod http_server;
pub mod state;
pub mod validate;

// Re-export key types for convenience
pub use config::Config;
pub use state::AppState;
