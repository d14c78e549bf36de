use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::StoreError;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct UnpublishContentResponse {
    pub content_id: Uuid,
    pub published: bool,
}

/// Revoke the share link for a content item. Idempotent: unpublishing an
/// item that is not shared succeeds.
pub async fn handler(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(content_id): Path<Uuid>,
) -> Result<impl IntoResponse, UnpublishContentError> {
    state
        .database()
        .unpublish_content(&content_id, &owner)
        .await?;

    tracing::info!(content_id = %content_id, owner = %owner, "content unpublished");

    Ok((
        http::StatusCode::OK,
        Json(UnpublishContentResponse {
            content_id,
            published: false,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UnpublishContentError {
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for UnpublishContentError {
    fn into_response(self) -> Response {
        let UnpublishContentError::Store(err) = self;
        crate::http_server::store_error_response(err, "CONTENT UNPUBLISH ERROR")
    }
}
