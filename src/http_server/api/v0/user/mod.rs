use axum::routing::{get, post};
use axum::Router;

pub mod login;
pub mod profile;
pub mod signup;

// Re-export for convenience
pub use login::LoginRequest;
pub use signup::SignupRequest;

use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup::handler))
        .route("/login", post(login::handler))
        .route("/profile", get(profile::handler))
        .with_state(state)
}
