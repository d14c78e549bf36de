use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::StoreError;
use crate::validate::ValidationError;
use crate::AppState;

use super::create::ContentRequest;

pub async fn handler(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(content_id): Path<Uuid>,
    Json(req): Json<ContentRequest>,
) -> Result<impl IntoResponse, UpdateContentError> {
    let params = req.into_params()?;
    let content = state
        .database()
        .update_content(&content_id, &owner, params)
        .await?;

    tracing::info!(content_id = %content_id, owner = %owner, "content updated");

    Ok((http::StatusCode::OK, Json(content)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateContentError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for UpdateContentError {
    fn into_response(self) -> Response {
        match self {
            UpdateContentError::Validation(e) => (
                http::StatusCode::BAD_REQUEST,
                axum::Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response(),
            UpdateContentError::Store(e) => {
                crate::http_server::store_error_response(e, "CONTENT UPDATE ERROR")
            }
        }
    }
}
