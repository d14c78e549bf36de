use axum::routing::{delete, get, post, put};
use axum::Router;

pub mod create;
pub mod delete_content;
pub mod list;
pub mod publish;
pub mod unpublish;
pub mod update;

// Re-export for convenience
pub use create::ContentRequest;

use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create::handler))
        .route("/", get(list::handler))
        .route("/:content_id", put(update::handler))
        .route("/:content_id", delete(delete_content::handler))
        .route("/:content_id/publish", post(publish::handler))
        .route("/:content_id/publish", delete(unpublish::handler))
        .with_state(state)
}
