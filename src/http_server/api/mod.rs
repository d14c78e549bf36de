use axum::Router;

pub mod v0;

use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/v0", v0::router(state.clone()))
        .with_state(state)
}
