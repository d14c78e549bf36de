use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::StoreError;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct PublishContentResponse {
    pub content_id: Uuid,
    pub hash: String,
}

/// Publish a content item, returning the hash to embed in a public share
/// URL. Publishing an already-shared item returns the existing hash.
pub async fn handler(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(content_id): Path<Uuid>,
) -> Result<impl IntoResponse, PublishContentError> {
    let hash = state.database().publish_content(&content_id, &owner).await?;

    tracing::info!(content_id = %content_id, owner = %owner, "content published");

    Ok((
        http::StatusCode::OK,
        Json(PublishContentResponse { content_id, hash }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum PublishContentError {
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for PublishContentError {
    fn into_response(self) -> Response {
        let PublishContentError::Store(err) = self;
        crate::http_server::store_error_response(err, "CONTENT PUBLISH ERROR")
    }
}
