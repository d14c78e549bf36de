use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::StoreError;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct DeleteContentResponse {
    pub deleted: bool,
}

/// Delete a content item. Any share link pointing at it is removed in the
/// same transaction, so its former hash stops resolving.
pub async fn handler(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(content_id): Path<Uuid>,
) -> Result<impl IntoResponse, DeleteContentError> {
    state.database().delete_content(&content_id, &owner).await?;

    tracing::info!(content_id = %content_id, owner = %owner, "content deleted");

    Ok((
        http::StatusCode::OK,
        Json(DeleteContentResponse { deleted: true }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteContentError {
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for DeleteContentError {
    fn into_response(self) -> Response {
        let DeleteContentError::Store(err) = self;
        crate::http_server::store_error_response(err, "CONTENT DELETE ERROR")
    }
}
