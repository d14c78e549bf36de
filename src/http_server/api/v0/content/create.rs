use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::database::{ContentParams, StoreError};
use crate::validate;
use crate::validate::ValidationError;
use crate::AppState;

/// Body for creating or replacing a content item. The type arrives as a
/// free string and is checked against the enumeration before anything
/// touches storage.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRequest {
    pub link: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub title: String,
    pub display_text: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ContentRequest {
    /// Pure validation into store parameters; a `ValidationError` here is
    /// answered with 400 and never reaches storage.
    pub fn into_params(self) -> Result<ContentParams, ValidationError> {
        Ok(ContentParams {
            link: validate::link(&self.link)?,
            content_type: validate::content_type(&self.content_type)?,
            title: validate::title(&self.title)?,
            display_text: self.display_text,
            tag_names: validate::tag_names(&self.tags)?,
        })
    }
}

pub async fn handler(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Json(req): Json<ContentRequest>,
) -> Result<impl IntoResponse, CreateContentError> {
    let params = req.into_params()?;
    let content = state.database().create_content(&owner, params).await?;

    tracing::info!(content_id = %content.content_id, owner = %owner, "content created");

    Ok((http::StatusCode::CREATED, Json(content)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateContentError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for CreateContentError {
    fn into_response(self) -> Response {
        match self {
            CreateContentError::Validation(e) => (
                http::StatusCode::BAD_REQUEST,
                axum::Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response(),
            CreateContentError::Store(e) => {
                crate::http_server::store_error_response(e, "CONTENT CREATE ERROR")
            }
        }
    }
}
