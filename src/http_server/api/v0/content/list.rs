use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::database::{Content, StoreError};
use crate::validate;
use crate::validate::ValidationError;
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct ListContentQuery {
    /// Optional type filter, e.g. `?type=article`
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListContentResponse {
    pub contents: Vec<Content>,
}

pub async fn handler(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Query(query): Query<ListContentQuery>,
) -> Result<impl IntoResponse, ListContentError> {
    let type_filter = query
        .content_type
        .as_deref()
        .map(validate::content_type)
        .transpose()?;

    let contents = state.database().list_content(&owner, type_filter).await?;

    Ok((http::StatusCode::OK, Json(ListContentResponse { contents })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListContentError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ListContentError {
    fn into_response(self) -> Response {
        match self {
            ListContentError::Validation(e) => (
                http::StatusCode::BAD_REQUEST,
                axum::Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response(),
            ListContentError::Store(e) => {
                crate::http_server::store_error_response(e, "CONTENT LIST ERROR")
            }
        }
    }
}
