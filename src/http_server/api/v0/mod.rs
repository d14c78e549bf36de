use axum::Router;

pub mod content;
pub mod user;

use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/user", user::router(state.clone()))
        .nest("/content", content::router(state.clone()))
        .with_state(state)
}
