use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::database::StoreError;
use crate::AppState;

/// Profile of the authenticated user. The password hash is not part of any
/// serialized surface.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
}

pub async fn handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ProfileError> {
    let user = state
        .database()
        .user_by_id(&user_id)
        .await?
        .ok_or(ProfileError::Store(StoreError::NotFound))?;

    Ok((
        http::StatusCode::OK,
        Json(ProfileResponse {
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let ProfileError::Store(err) = self;
        crate::http_server::store_error_response(err, "PROFILE ERROR")
    }
}
